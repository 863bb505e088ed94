//! Snapshot file format detection.

use std::path::Path;

/// How a snapshot file is wrapped on disk.
///
/// This is the only place a file name influences how it is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    /// Handed to the decoder as-is.
    Plain,
    /// Gzip stream around a plain snapshot (`.grib2.gz`, `.json.gz`, ...).
    GzipWrapped,
}

impl SnapshotFormat {
    /// Detect the wrapping from the file extension (case-insensitive).
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("gz") || ext.eq_ignore_ascii_case("gzip") => {
                Self::GzipWrapped
            }
            _ => Self::Plain,
        }
    }

    /// Suffix for the decompressed scratch file, e.g. `.grib2` for
    /// `MRMS_PrecipRate.grib2.gz`. Empty if the inner name has no extension.
    pub fn inner_suffix(path: &Path) -> String {
        path.file_stem()
            .map(Path::new)
            .and_then(|stem| stem.extension())
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::GzipWrapped => "gzip",
        }
    }
}

impl std::fmt::Display for SnapshotFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
