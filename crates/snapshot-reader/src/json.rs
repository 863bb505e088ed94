//! JSON snapshot interchange format.
//!
//! ```json
//! {
//!   "timestamp": "2024-05-02T12:00:00Z",
//!   "latitude": [42.0, 41.99],
//!   "longitude": [271.0, 271.01],
//!   "values": [[0.0, 1.5], [null, 0.2]]
//! }
//! ```
//!
//! `values` is row-major (one row per latitude). `null` marks a missing cell.

use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use series_common::{GridAxes, GridError, GridField};

use crate::reader::{open_plain, SnapshotDecoder};
use crate::snapshot::Snapshot;

/// Serialized form of a [`Snapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSnapshot {
    pub timestamp: DateTime<Utc>,
    pub latitude: Vec<f64>,
    pub longitude: Vec<f64>,
    pub values: Vec<Vec<Option<f32>>>,
}

impl JsonSnapshot {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let grid = snapshot.grid();
        let cols = grid.longitude.len().max(1);
        let values = snapshot
            .field()
            .values()
            .chunks(cols)
            .map(|row| {
                row.iter()
                    .map(|&v| if v.is_finite() { Some(v) } else { None })
                    .collect()
            })
            .collect();

        Self {
            timestamp: snapshot.timestamp(),
            latitude: grid.latitude.clone(),
            longitude: grid.longitude.clone(),
            values,
        }
    }

    /// Flatten into a [`Snapshot`]; missing cells become NaN.
    pub fn into_snapshot(self) -> Result<Snapshot, GridError> {
        let rows = self.latitude.len();
        let cols = self.longitude.len();

        let ragged = self.values.len() != rows || self.values.iter().any(|r| r.len() != cols);
        if ragged {
            return Err(GridError::ShapeMismatch {
                rows,
                cols,
                expected: rows * cols,
                found: self.values.iter().map(Vec::len).sum(),
            });
        }

        let values = self
            .values
            .into_iter()
            .flatten()
            .map(|v| v.unwrap_or(f32::NAN))
            .collect();

        let field = GridField::new(GridAxes::new(self.latitude, self.longitude), values)?;
        Ok(Snapshot::new(self.timestamp, field))
    }
}

/// Decoder for [`JsonSnapshot`] files.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSnapshotDecoder;

impl SnapshotDecoder for JsonSnapshotDecoder {
    fn decode(&self, path: &Path) -> anyhow::Result<Snapshot> {
        let reader = open_plain(path)?;
        let parsed: JsonSnapshot = serde_json::from_reader(reader)
            .with_context(|| format!("parsing snapshot JSON in {}", path.display()))?;
        Ok(parsed.into_snapshot()?)
    }
}
