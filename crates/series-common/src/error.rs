//! Error types for extent, grid and geometry handling.

use thiserror::Error;

/// Invalid run configuration. Always fatal: raised before any parallel work.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Degenerate extent: {axis} range has zero width at {value}")]
    DegenerateExtent { axis: &'static str, value: f64 },

    #[error("Invalid extent bound for {axis}: {value}")]
    InvalidBound { axis: &'static str, value: f64 },

    #[error("Longitude window {left}..{right} wraps in raster convention")]
    WrappedWindow { left: f64, right: f64 },

    #[error("Clip window selects no {axis} coordinates of the reference grid")]
    EmptyWindow { axis: &'static str },

    #[error("Expected exactly {expected} region(s), found {found}")]
    RegionCount { expected: usize, found: usize },

    #[error("Duplicate region identifier: {0}")]
    DuplicateRegionId(String),

    #[error("Region set is empty")]
    EmptyRegionSet,

    #[error("No snapshot files were provided")]
    EmptyFileList,

    #[error("Invalid setting '{name}': {message}")]
    InvalidSetting { name: &'static str, message: String },

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(String),
}

impl ConfigError {
    /// Create an InvalidSetting error.
    pub fn invalid_setting(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidSetting {
            name,
            message: message.into(),
        }
    }
}

/// Invalid or unusable region geometry.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Invalid WKT: {0}")]
    InvalidWkt(String),

    #[error("Invalid GeoJSON: {0}")]
    InvalidGeoJson(String),

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Ring must have at least 3 distinct vertices, found {0}")]
    TooFewVertices(usize),

    #[error("Polygon has zero area")]
    ZeroArea,

    #[error("Geometry has no polygons")]
    EmptyGeometry,

    #[error("None of the {regions} region(s) overlap the reference grid")]
    NoOverlap { regions: usize },
}

/// Malformed grid data.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    #[error("{axis} axis is empty")]
    EmptyAxis { axis: &'static str },

    #[error("{axis} axis is not strictly monotonic at index {index}")]
    NotMonotonic { axis: &'static str, index: usize },

    #[error("Expected {expected} values for a {rows}x{cols} grid, found {found}")]
    ShapeMismatch {
        rows: usize,
        cols: usize,
        expected: usize,
        found: usize,
    },
}
