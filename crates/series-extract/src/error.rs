//! Error types for series extraction.

use series_common::{ConfigError, GeometryError, GridError, RegionLoadError};
use snapshot_reader::ReadError;
use thiserror::Error;

/// Fatal failures of a pipeline run.
///
/// Only the sequential setup stage (configuration, plan build from the
/// reference snapshot) produces these. Per-file read failures during the
/// parallel phase are recorded in the [`SeriesReport`] instead.
///
/// [`SeriesReport`]: crate::SeriesReport
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Grid(#[from] GridError),

    /// The reference snapshot could not be read, so no plan exists.
    #[error("Failed to read reference snapshot: {0}")]
    Reference(#[from] ReadError),
}

impl From<RegionLoadError> for PipelineError {
    fn from(err: RegionLoadError) -> Self {
        match err {
            RegionLoadError::Geometry(e) => Self::Geometry(e),
            RegionLoadError::Config(e) => Self::Config(e),
        }
    }
}

/// Result type for pipeline runs.
pub type Result<T> = std::result::Result<T, PipelineError>;
