//! Geographic extents and their grid-native clip windows.
//!
//! An [`Extent`] is authored in the geographic convention (longitudes in
//! -180..180). Raster snapshots store longitude as 0..360, so any negative
//! bound is shifted by [`RASTER_LON_SHIFT`] before slicing. Only a single
//! shift is supported: windows that wrap across 0° in raster convention are
//! rejected.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::error::ConfigError;
use crate::grid::{AxisOrder, GridAxes};

/// Offset between geographic (-180..180) and raster (0..360) longitudes.
pub const RASTER_LON_SHIFT: f64 = 360.0;

/// Normalized geographic bounding window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    up_lat: f64,
    down_lat: f64,
    left_lon: f64,
    right_lon: f64,
}

impl Extent {
    /// Build an extent from a latitude pair and a longitude pair given in any
    /// order.
    pub fn new(lats: (f64, f64), lons: (f64, f64)) -> Result<Self, ConfigError> {
        for lat in [lats.0, lats.1] {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(ConfigError::InvalidBound {
                    axis: "latitude",
                    value: lat,
                });
            }
        }
        for lon in [lons.0, lons.1] {
            if !(-180.0..=180.0).contains(&lon) {
                return Err(ConfigError::InvalidBound {
                    axis: "longitude",
                    value: lon,
                });
            }
        }

        let (down_lat, up_lat) = (lats.0.min(lats.1), lats.0.max(lats.1));
        let (left_lon, right_lon) = (lons.0.min(lons.1), lons.0.max(lons.1));

        if up_lat == down_lat {
            return Err(ConfigError::DegenerateExtent {
                axis: "latitude",
                value: up_lat,
            });
        }
        if left_lon == right_lon {
            return Err(ConfigError::DegenerateExtent {
                axis: "longitude",
                value: left_lon,
            });
        }

        Ok(Self {
            up_lat,
            down_lat,
            left_lon,
            right_lon,
        })
    }

    /// Build an extent covering a bounding box.
    ///
    /// Longitudes past 180 (raster convention) are folded back to geographic.
    pub fn from_bounds(bbox: &BoundingBox) -> Result<Self, ConfigError> {
        Self::new(
            (bbox.min_lat, bbox.max_lat),
            (to_geographic_lon(bbox.min_lon), to_geographic_lon(bbox.max_lon)),
        )
    }

    pub fn up_lat(&self) -> f64 {
        self.up_lat
    }

    pub fn down_lat(&self) -> f64 {
        self.down_lat
    }

    pub fn left_lon(&self) -> f64 {
        self.left_lon
    }

    pub fn right_lon(&self) -> f64 {
        self.right_lon
    }

    /// Check if a geographic point falls inside the extent (edges inclusive).
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.down_lat && lat <= self.up_lat && lon >= self.left_lon && lon <= self.right_lon
    }

    /// The extent as a geographic bounding box.
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(self.left_lon, self.down_lat, self.right_lon, self.up_lat)
    }

    /// Longitude bounds in raster (0..360) convention.
    pub fn raster_lons(&self) -> (f64, f64) {
        (to_raster_lon(self.left_lon), to_raster_lon(self.right_lon))
    }

    /// Grid-native clip window for a reference grid.
    ///
    /// The slice bounds follow the stored order of each reference axis, so a
    /// north-to-south latitude axis gets `up_lat..down_lat`.
    pub fn clip_window(&self, reference: &GridAxes) -> Result<ClipWindow, ConfigError> {
        let (left, right) = self.raster_lons();
        if left > right {
            return Err(ConfigError::WrappedWindow { left, right });
        }

        let latitude = match reference.lat_order() {
            AxisOrder::Ascending => AxisSlice::new(self.down_lat, self.up_lat),
            AxisOrder::Descending => AxisSlice::new(self.up_lat, self.down_lat),
        };
        let longitude = match reference.lon_order() {
            AxisOrder::Ascending => AxisSlice::new(left, right),
            AxisOrder::Descending => AxisSlice::new(right, left),
        };

        Ok(ClipWindow {
            latitude,
            longitude,
        })
    }
}

/// Shift a geographic longitude into raster convention.
pub fn to_raster_lon(lon: f64) -> f64 {
    if lon < 0.0 {
        lon + RASTER_LON_SHIFT
    } else {
        lon
    }
}

/// Fold a raster longitude back into geographic convention.
pub fn to_geographic_lon(lon: f64) -> f64 {
    if lon > 180.0 {
        lon - RASTER_LON_SHIFT
    } else {
        lon
    }
}

/// Inclusive label slice along one axis, bounds in stored axis order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisSlice {
    pub start: f64,
    pub stop: f64,
}

impl AxisSlice {
    pub fn new(start: f64, stop: f64) -> Self {
        Self { start, stop }
    }

    /// Indices of the coordinates falling within the slice.
    ///
    /// The axis is monotonic, so the selection is always contiguous.
    pub fn select(&self, axis: &[f64]) -> Range<usize> {
        let lo = self.start.min(self.stop);
        let hi = self.start.max(self.stop);
        let inside = |c: &f64| *c >= lo && *c <= hi;

        match (axis.iter().position(inside), axis.iter().rposition(inside)) {
            (Some(first), Some(last)) => first..last + 1,
            _ => 0..0,
        }
    }
}

/// Clip descriptor in the raster's own convention and axis order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipWindow {
    pub latitude: AxisSlice,
    pub longitude: AxisSlice,
}

impl ClipWindow {
    /// Clipped reference axes. Fails if either axis comes out empty.
    pub fn apply(&self, reference: &GridAxes) -> Result<GridAxes, ConfigError> {
        let (rows, cols) = reference.clip_ranges(self);
        if rows.is_empty() {
            return Err(ConfigError::EmptyWindow { axis: "latitude" });
        }
        if cols.is_empty() {
            return Err(ConfigError::EmptyWindow { axis: "longitude" });
        }
        Ok(GridAxes::new(
            reference.latitude[rows].to_vec(),
            reference.longitude[cols].to_vec(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_any_order() {
        let a = Extent::new((30.0, 40.0), (-100.0, -90.0)).unwrap();
        let b = Extent::new((40.0, 30.0), (-90.0, -100.0)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.up_lat(), 40.0);
        assert_eq!(a.down_lat(), 30.0);
        assert_eq!(a.left_lon(), -100.0);
        assert_eq!(a.right_lon(), -90.0);
    }

    #[test]
    fn test_degenerate_extent() {
        let err = Extent::new((30.0, 30.0), (-100.0, -90.0)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DegenerateExtent {
                axis: "latitude",
                ..
            }
        ));
        let err = Extent::new((30.0, 31.0), (-90.0, -90.0)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DegenerateExtent {
                axis: "longitude",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_nan_and_out_of_range() {
        assert!(Extent::new((f64::NAN, 30.0), (-100.0, -90.0)).is_err());
        assert!(Extent::new((30.0, 95.0), (-100.0, -90.0)).is_err());
        assert!(Extent::new((30.0, 40.0), (-100.0, 200.0)).is_err());
    }

    #[test]
    fn test_raster_lons_shift_only_negative() {
        let e = Extent::new((30.0, 40.0), (-100.0, -90.0)).unwrap();
        assert_eq!(e.raster_lons(), (260.0, 270.0));
        let e = Extent::new((30.0, 40.0), (10.0, 20.0)).unwrap();
        assert_eq!(e.raster_lons(), (10.0, 20.0));
    }

    #[test]
    fn test_from_bounds_folds_raster_longitudes() {
        let shifted = Extent::from_bounds(&BoundingBox::new(270.0, 30.0, 280.0, 40.0)).unwrap();
        let geo = Extent::from_bounds(&BoundingBox::new(-90.0, 30.0, -80.0, 40.0)).unwrap();
        assert_eq!(shifted, geo);
    }

    #[test]
    fn test_clip_window_follows_stored_order() {
        let e = Extent::new((30.0, 40.0), (-100.0, -90.0)).unwrap();

        let north_to_south = GridAxes::new(vec![45.0, 35.0, 25.0], vec![255.0, 265.0, 275.0]);
        let window = e.clip_window(&north_to_south).unwrap();
        assert_eq!(window.latitude, AxisSlice::new(40.0, 30.0));
        assert_eq!(window.longitude, AxisSlice::new(260.0, 270.0));

        let south_to_north = GridAxes::new(vec![25.0, 35.0, 45.0], vec![275.0, 265.0, 255.0]);
        let window = e.clip_window(&south_to_north).unwrap();
        assert_eq!(window.latitude, AxisSlice::new(30.0, 40.0));
        assert_eq!(window.longitude, AxisSlice::new(270.0, 260.0));

        let clipped = window.apply(&south_to_north).unwrap();
        assert_eq!(clipped.latitude, vec![35.0]);
        assert_eq!(clipped.longitude, vec![265.0]);
    }

    #[test]
    fn test_wrapped_window_rejected() {
        let e = Extent::new((30.0, 40.0), (-10.0, 10.0)).unwrap();
        let grid = GridAxes::new(vec![35.0], vec![0.0, 10.0, 350.0]);
        assert!(matches!(
            e.clip_window(&grid),
            Err(ConfigError::WrappedWindow { .. })
        ));
    }

    #[test]
    fn test_empty_window() {
        let e = Extent::new((60.0, 70.0), (-100.0, -90.0)).unwrap();
        let grid = GridAxes::new(vec![45.0, 35.0], vec![260.0, 270.0]);
        let window = e.clip_window(&grid).unwrap();
        assert_eq!(
            window.apply(&grid),
            Err(ConfigError::EmptyWindow { axis: "latitude" })
        );
    }

    #[test]
    fn test_inclusive_select() {
        let slice = AxisSlice::new(1.0, 3.0);
        assert_eq!(slice.select(&[0.0, 1.0, 2.0, 3.0, 4.0]), 1..4);
        assert_eq!(slice.select(&[4.0, 3.0, 2.0, 1.0, 0.0]), 1..4);
        assert_eq!(slice.select(&[5.0, 6.0]), 0..0);
    }
}
