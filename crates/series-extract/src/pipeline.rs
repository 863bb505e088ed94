//! Pipeline entry points.

use std::path::PathBuf;

use series_common::{ConfigError, Extent, RegionSet};
use snapshot_reader::RasterReader;
use tracing::{info, instrument};

use crate::config::ExtractionConfig;
use crate::error::Result;
use crate::executor::{CancelToken, ParallelExecutor};
use crate::plan::ExtractionPlan;
use crate::probe::PointProbe;
use crate::sampler::GridSampler;
use crate::series::{SeriesAssembler, SeriesReport};

/// Extracts region and point time series from a list of snapshot files.
///
/// Setup (configuration checks, reading the first file, clipping and mask
/// rasterization) runs sequentially and any failure there is returned as a
/// [`PipelineError`](crate::PipelineError). The per-file phase never fails
/// as a whole: unreadable files are listed in [`SeriesReport::failed`].
///
/// The caller's file order does not matter; rows are sorted by timestamp.
pub struct SeriesExtractor<R> {
    reader: R,
    config: ExtractionConfig,
    extent: Option<Extent>,
    cancel: CancelToken,
}

impl<R: RasterReader> SeriesExtractor<R> {
    pub fn new(reader: R, config: ExtractionConfig) -> Self {
        Self {
            reader,
            config,
            extent: None,
            cancel: CancelToken::new(),
        }
    }

    /// Clip to `extent` instead of the union of region bounds.
    pub fn with_extent(mut self, extent: Extent) -> Self {
        self.extent = Some(extent);
        self
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Mean value per region per snapshot.
    ///
    /// Without [`with_extent`](Self::with_extent) the clip window is the union
    /// of all region bounds. Regions on both sides of 0° longitude then give a
    /// window that wraps in raster convention and the run fails with
    /// [`ConfigError::WrappedWindow`]; pass an explicit extent over the grid
    /// and far-away regions just get an all-`None` column.
    #[instrument(skip_all, fields(files = files.len(), regions = regions.len()))]
    pub fn multipolygon_series(
        &self,
        files: &[PathBuf],
        regions: &RegionSet,
    ) -> Result<SeriesReport> {
        let executor = self.prepare(files)?;

        let extent = match &self.extent {
            Some(extent) => *extent,
            None => regions.extent()?,
        };

        // The plan is derived from the first file only; a failure here is fatal.
        let reference = self.reader.read(&files[0])?;
        let sampler = if self.config.upsample {
            Some(GridSampler::new(self.config.upsample_factor)?)
        } else {
            None
        };
        let plan = ExtractionPlan::build(&reference, extent, regions, sampler.as_ref())?;
        drop(reference);

        let outcomes = executor.run(files, &self.reader, &plan);
        let report = SeriesAssembler::assemble(outcomes);
        info!(
            rows = report.series.len(),
            failed = report.failed_count(),
            "Region series complete"
        );
        Ok(report)
    }

    /// Single-region mode: exactly one region is required.
    pub fn polygon_series(&self, files: &[PathBuf], regions: &RegionSet) -> Result<SeriesReport> {
        regions.single()?;
        self.multipolygon_series(files, regions)
    }

    /// Nearest-cell value at `(lat, lon)` per snapshot, in column `"value"`.
    #[instrument(skip_all, fields(files = files.len(), lat = lat, lon = lon))]
    pub fn point_series(&self, files: &[PathBuf], lat: f64, lon: f64) -> Result<SeriesReport> {
        let executor = self.prepare(files)?;
        let probe = PointProbe::new(lat, lon)?;

        let outcomes = executor.run(files, &self.reader, &probe);
        let report = SeriesAssembler::assemble(outcomes);
        info!(
            rows = report.series.len(),
            failed = report.failed_count(),
            "Point series complete"
        );
        Ok(report)
    }

    fn prepare(&self, files: &[PathBuf]) -> Result<ParallelExecutor> {
        self.config.validate()?;
        self.reader.validate()?;
        if files.is_empty() {
            return Err(ConfigError::EmptyFileList.into());
        }
        Ok(ParallelExecutor::new(self.config.workers)?.with_cancel_token(self.cancel.clone()))
    }
}
