//! Nearest-cell value at a single location.

use std::path::Path;

use series_common::{nearest_index, to_raster_lon, ConfigError};
use snapshot_reader::{ReadError, Snapshot};

use crate::worker::{RowValues, SnapshotExtractor};

/// Column name of a point series.
pub const POINT_COLUMN: &str = "value";

/// Samples the grid cell nearest to a geographic lat/lon.
///
/// A location outside the snapshot's coordinate range, or a non-finite cell
/// value, yields `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointProbe {
    lat: f64,
    lon: f64,
}

impl PointProbe {
    pub fn new(lat: f64, lon: f64) -> Result<Self, ConfigError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ConfigError::InvalidBound {
                axis: "latitude",
                value: lat,
            });
        }
        if !(-180.0..=360.0).contains(&lon) {
            return Err(ConfigError::InvalidBound {
                axis: "longitude",
                value: lon,
            });
        }
        Ok(Self { lat, lon })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Value of the nearest cell of `snapshot`.
    pub fn sample(&self, snapshot: &Snapshot) -> Option<f64> {
        let grid = snapshot.grid();
        let row = nearest_index(&grid.latitude, self.lat)?;
        let col = nearest_index(&grid.longitude, to_raster_lon(self.lon))?;
        snapshot
            .field()
            .get(row, col)
            .filter(|v| v.is_finite())
            .map(f64::from)
    }
}

impl SnapshotExtractor for PointProbe {
    fn extract(&self, snapshot: &Snapshot, _path: &Path) -> Result<RowValues, ReadError> {
        Ok(vec![(POINT_COLUMN.to_string(), self.sample(snapshot))])
    }
}
