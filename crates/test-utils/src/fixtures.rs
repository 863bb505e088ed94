//! Snapshot fixture files for pipeline tests.
//!
//! Fixtures are written in the JSON snapshot interchange format, optionally
//! gzip-wrapped, into a temporary directory that is removed on drop.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use series_common::GridAxes;
use snapshot_reader::JsonSnapshot;
use tempfile::TempDir;

/// Common geographic extents for testing, as `(min_lon, min_lat, max_lon, max_lat)`.
pub mod bbox {
    /// South Atlantic, far outside any CONUS grid
    pub const OFFSHORE: (f64, f64, f64, f64) = (-30.0, -40.0, -29.0, -39.0);
}

/// WKT rectangle for a `(min_lon, min_lat, max_lon, max_lat)` extent.
pub fn bbox_wkt((min_lon, min_lat, max_lon, max_lat): (f64, f64, f64, f64)) -> String {
    format!(
        "POLYGON(({min_lon} {min_lat}, {max_lon} {min_lat}, {max_lon} {max_lat}, \
         {min_lon} {max_lat}, {min_lon} {min_lat}))"
    )
}

/// A temporary directory of snapshot fixture files.
pub struct SnapshotDir {
    dir: TempDir,
}

impl SnapshotDir {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a plain JSON snapshot.
    pub fn write_plain(
        &self,
        name: &str,
        timestamp: DateTime<Utc>,
        grid: &GridAxes,
        values: &[f32],
    ) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, snapshot_json(timestamp, grid, values)).unwrap();
        path
    }

    /// Write a gzip-wrapped JSON snapshot.
    pub fn write_gzip(
        &self,
        name: &str,
        timestamp: DateTime<Utc>,
        grid: &GridAxes,
        values: &[f32],
    ) -> PathBuf {
        let path = self.dir.path().join(name);
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder
            .write_all(&snapshot_json(timestamp, grid, values))
            .unwrap();
        encoder.finish().unwrap();
        path
    }

    /// Write a file no decoder can make sense of.
    pub fn write_unreadable(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, b"GRIB\x00\x00truncated").unwrap();
        path
    }

    /// Path inside the directory that does not exist.
    pub fn missing(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

impl Default for SnapshotDir {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize a row-major field as a JSON snapshot. NaN cells become `null`.
pub fn snapshot_json(timestamp: DateTime<Utc>, grid: &GridAxes, values: &[f32]) -> Vec<u8> {
    let cols = grid.longitude.len().max(1);
    let snapshot = JsonSnapshot {
        timestamp,
        latitude: grid.latitude.clone(),
        longitude: grid.longitude.clone(),
        values: values
            .chunks(cols)
            .map(|row| {
                row.iter()
                    .map(|&v| if v.is_nan() { None } else { Some(v) })
                    .collect()
            })
            .collect(),
    };
    serde_json::to_vec(&snapshot).unwrap()
}

/// MRMS-style file name for a timestamp, e.g.
/// `MRMS_PrecipRate_00.00_20240502-120000.json`.
pub fn mrms_file_name(timestamp: DateTime<Utc>, gzip: bool) -> String {
    format!(
        "MRMS_PrecipRate_00.00_{}.json{}",
        timestamp.format("%Y%m%d-%H%M%S"),
        if gzip { ".gz" } else { "" }
    )
}
