//! Masked-raster aggregation of precipitation snapshots.
//!
//! Turns a list of gridded snapshot files plus a set of polygon regions into
//! one time series per region:
//!
//! 1. Read the first file and derive an [`ExtractionPlan`]: clip window,
//!    optional densified grid ([`GridSampler`]), one [`Mask`] per region
//!    ([`MaskRasterizer`]).
//! 2. Fan out over every file on a fixed-size rayon pool
//!    ([`ParallelExecutor`]), reducing each snapshot to per-region means.
//! 3. Merge the per-file outcomes into a timestamp-ordered [`Series`]
//!    ([`SeriesAssembler`]). Unreadable files are reported, not fatal.
//!
//! # Example
//!
//! ```ignore
//! use series_common::RegionSet;
//! use series_extract::{ExtractionConfig, SeriesExtractor};
//! use snapshot_reader::{JsonSnapshotDecoder, ReaderConfig, SnapshotReader};
//!
//! let reader = SnapshotReader::new(JsonSnapshotDecoder, ReaderConfig::from_env());
//! let extractor = SeriesExtractor::new(reader, ExtractionConfig::from_env());
//!
//! let regions = RegionSet::from_geojson(&geojson, Some("QueryID"))?;
//! let report = extractor.multipolygon_series(&files, &regions)?;
//! report.series.write_csv(std::io::stdout())?;
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod mask;
pub mod pipeline;
pub mod plan;
pub mod probe;
pub mod sampler;
pub mod series;
pub mod worker;

pub use config::ExtractionConfig;
pub use error::{PipelineError, Result};
pub use executor::{CancelToken, FileOutcome, ParallelExecutor};
pub use mask::{Mask, MaskRasterizer, MaskSet};
pub use pipeline::SeriesExtractor;
pub use plan::ExtractionPlan;
pub use probe::{PointProbe, POINT_COLUMN};
pub use sampler::{DenseGrid, GridSampler, DEFAULT_UPSAMPLE_FACTOR};
pub use series::{FailedFile, Series, SeriesAssembler, SeriesReport, SeriesRow, SkippedFile};
pub use worker::{ExtractionWorker, RowValues, SnapshotExtractor};
