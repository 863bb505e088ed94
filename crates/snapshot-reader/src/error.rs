//! Error types for snapshot reading.

use std::path::{Path, PathBuf};

use series_common::GridError;
use thiserror::Error;

/// A single snapshot file could not be turned into a usable [`Snapshot`].
///
/// During the parallel phase these are recorded per file and never abort the
/// run.
///
/// [`Snapshot`]: crate::Snapshot
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("Failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create scratch file for {}: {source}", .path.display())]
    Scratch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decompress {}: {source}", .path.display())]
    Decompress {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Malformed grid in {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: GridError,
    },

    #[error(
        "Grid of {} does not match the reference (reference shape {expected:?}, found {found:?})",
        .path.display()
    )]
    IncompatibleGrid {
        path: PathBuf,
        expected: (usize, usize),
        found: (usize, usize),
    },
}

impl ReadError {
    /// The file this error refers to.
    pub fn path(&self) -> &Path {
        match self {
            Self::Open { path, .. }
            | Self::Scratch { path, .. }
            | Self::Decompress { path, .. }
            | Self::Decode { path, .. }
            | Self::Malformed { path, .. }
            | Self::IncompatibleGrid { path, .. } => path,
        }
    }

    /// Create an IncompatibleGrid error.
    pub fn incompatible_grid(
        path: impl Into<PathBuf>,
        expected: (usize, usize),
        found: (usize, usize),
    ) -> Self {
        Self::IncompatibleGrid {
            path: path.into(),
            expected,
            found,
        }
    }
}

/// Result type for snapshot reading.
pub type Result<T> = std::result::Result<T, ReadError>;
