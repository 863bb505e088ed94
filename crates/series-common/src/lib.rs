//! Common types shared by the precipitation series crates.
//!
//! Everything here is independent of how snapshots are decoded or how the
//! extraction is scheduled:
//!
//! - [`BoundingBox`] and [`Extent`]: geographic windows and the grid-native
//!   [`ClipWindow`] used to slice raster snapshots
//! - [`GridAxes`] and [`GridField`]: rectilinear lat/lon grids and their values
//! - [`Region`] and [`RegionSet`]: identified polygons in geographic coordinates

pub mod bbox;
pub mod error;
pub mod extent;
pub mod geometry;
pub mod grid;
pub mod region;

pub use bbox::BoundingBox;
pub use error::{ConfigError, GeometryError, GridError};
pub use extent::{
    to_geographic_lon, to_raster_lon, AxisSlice, ClipWindow, Extent, RASTER_LON_SHIFT,
};
pub use geometry::{MultiPolygon, Polygon};
pub use grid::{nearest_index, AxisOrder, GridAxes, GridField};
pub use region::{default_region_id, Region, RegionLoadError, RegionSet};
