//! A single time-stamped raster grid.

use chrono::{DateTime, Utc};
use series_common::{GridAxes, GridError, GridField};

/// One decoded snapshot file. Transient: owned by exactly one extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    timestamp: DateTime<Utc>,
    field: GridField,
}

impl Snapshot {
    pub fn new(timestamp: DateTime<Utc>, field: GridField) -> Self {
        Self { timestamp, field }
    }

    /// Build from raw axes and row-major values, validating the shape.
    pub fn from_parts(
        timestamp: DateTime<Utc>,
        latitude: Vec<f64>,
        longitude: Vec<f64>,
        values: Vec<f32>,
    ) -> Result<Self, GridError> {
        let field = GridField::new(GridAxes::new(latitude, longitude), values)?;
        Ok(Self::new(timestamp, field))
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn field(&self) -> &GridField {
        &self.field
    }

    pub fn grid(&self) -> &GridAxes {
        self.field.grid()
    }
}
