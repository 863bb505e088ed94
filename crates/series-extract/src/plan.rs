//! The per-run extraction plan derived from the reference snapshot.

use std::path::Path;

use series_common::{ClipWindow, Extent, GridAxes, RegionSet};
use snapshot_reader::{ReadError, Snapshot};
use tracing::info;

use crate::error::Result;
use crate::mask::{MaskRasterizer, MaskSet};
use crate::sampler::{DenseGrid, GridSampler};
use crate::worker::{RowValues, SnapshotExtractor};

/// Everything a worker needs to reduce one snapshot to per-region means.
///
/// Built sequentially from the first file, then shared by reference across
/// the pool. Masks are never recomputed per snapshot.
#[derive(Debug, Clone)]
pub struct ExtractionPlan {
    extent: Extent,
    window: ClipWindow,
    grid: GridAxes,
    dense: Option<DenseGrid>,
    masks: MaskSet,
}

impl ExtractionPlan {
    /// Resolve the clip window against `reference`, optionally densify the
    /// clipped grid, and rasterize every region onto the result.
    pub fn build(
        reference: &Snapshot,
        extent: Extent,
        regions: &RegionSet,
        sampler: Option<&GridSampler>,
    ) -> Result<Self> {
        let window = extent.clip_window(reference.grid())?;
        let grid = window.apply(reference.grid())?;
        let dense = sampler.map(|s| s.densify(&grid));

        let target = dense.as_ref().map(DenseGrid::grid).unwrap_or(&grid);
        let masks = MaskRasterizer::build(regions, target)?;

        info!(
            rows = grid.shape().0,
            cols = grid.shape().1,
            target_rows = target.shape().0,
            target_cols = target.shape().1,
            regions = masks.len(),
            upsample = dense.is_some(),
            "Built extraction plan"
        );

        Ok(Self {
            extent,
            window,
            grid,
            dense,
            masks,
        })
    }

    pub fn extent(&self) -> &Extent {
        &self.extent
    }

    pub fn window(&self) -> &ClipWindow {
        &self.window
    }

    /// Clipped reference grid.
    pub fn grid(&self) -> &GridAxes {
        &self.grid
    }

    pub fn dense(&self) -> Option<&DenseGrid> {
        self.dense.as_ref()
    }

    pub fn masks(&self) -> &MaskSet {
        &self.masks
    }

    /// Shape of the grid masks and aggregated values live on.
    pub fn target_shape(&self) -> (usize, usize) {
        match &self.dense {
            Some(dense) => dense.shape(),
            None => self.grid.shape(),
        }
    }

    /// Clip `snapshot` and bring its values onto the target grid.
    pub fn target_values(
        &self,
        snapshot: &Snapshot,
        path: &Path,
    ) -> std::result::Result<Vec<f32>, ReadError> {
        let clipped = snapshot.field().clip(&self.window);
        if !clipped.grid().is_compatible(&self.grid) {
            return Err(ReadError::incompatible_grid(
                path,
                self.grid.shape(),
                clipped.shape(),
            ));
        }

        let (_, values) = clipped.into_parts();
        Ok(match &self.dense {
            Some(dense) => dense.resample(&values),
            None => values,
        })
    }
}

impl SnapshotExtractor for ExtractionPlan {
    fn extract(
        &self,
        snapshot: &Snapshot,
        path: &Path,
    ) -> std::result::Result<RowValues, ReadError> {
        let values = self.target_values(snapshot, path)?;
        Ok(self
            .masks
            .iter()
            .map(|(id, mask)| (id.to_string(), mask.mean(&values)))
            .collect())
    }
}
