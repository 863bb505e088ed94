//! Polygon rasterization onto the reference grid.

use rayon::prelude::*;
use series_common::{
    BoundingBox, GeometryError, GridAxes, MultiPolygon, Region, RegionSet, RASTER_LON_SHIFT,
};
use tracing::{debug, warn};

/// Boolean grid marking the cells whose centers lie strictly inside a region.
///
/// Row-major, same shape as the grid it was rasterized against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl Mask {
    /// Mask with every cell unset.
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![false; rows * cols],
        }
    }

    /// Mask with every cell set.
    pub fn full(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![true; rows * cols],
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    pub fn get(&self, row: usize, col: usize) -> Option<bool> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(self.cells[row * self.cols + col])
    }

    /// Number of set cells.
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    pub fn is_all_false(&self) -> bool {
        !self.cells.iter().any(|&c| c)
    }

    /// Arithmetic mean of `values` over the set cells, skipping non-finite
    /// values. `None` if nothing is left to average.
    pub fn mean(&self, values: &[f32]) -> Option<f64> {
        let (sum, count) = self
            .cells
            .iter()
            .zip(values)
            .filter(|&(&inside, v)| inside && v.is_finite())
            .fold((0.0f64, 0usize), |(sum, count), (_, &v)| {
                (sum + v as f64, count + 1)
            });

        if count == 0 {
            None
        } else {
            Some(sum / count as f64)
        }
    }
}

/// One mask per region, in region order. Built once per run, shared
/// read-only by every worker.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskSet {
    entries: Vec<(String, Mask)>,
}

impl MaskSet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Mask> {
        self.entries.iter().find(|(k, _)| k == id).map(|(_, m)| m)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Mask)> {
        self.entries.iter().map(|(k, m)| (k.as_str(), m))
    }
}

/// Rasterizes regions onto a reference grid.
///
/// Raster longitudes run 0..360, so a polygon drawn in -180..180 (any
/// negative longitude) is shifted east by 360 degrees as a whole before the
/// test. Polygons straddling longitude 0 are therefore not supported.
pub struct MaskRasterizer;

impl MaskRasterizer {
    /// Build masks for every region.
    ///
    /// A region that misses the grid gets an all-false mask. Fails with
    /// [`GeometryError::NoOverlap`] only if every region misses.
    pub fn build(regions: &RegionSet, grid: &GridAxes) -> Result<MaskSet, GeometryError> {
        let grid_bounds = grid_bbox(grid);
        let mut entries = Vec::with_capacity(regions.len());
        let mut overlapping = 0usize;

        for region in regions {
            let geometry = to_raster_convention(region.geometry());
            let overlaps = grid_bounds
                .as_ref()
                .is_some_and(|b| b.intersects(&geometry.bbox()));

            let mask = if overlaps {
                overlapping += 1;
                Self::rasterize_geometry(&geometry, grid)
            } else {
                warn!(region = region.id(), "Region does not overlap the reference grid");
                let (rows, cols) = grid.shape();
                Mask::empty(rows, cols)
            };

            debug!(region = region.id(), cells = mask.count(), "Rasterized region mask");
            entries.push((region.id().to_string(), mask));
        }

        if overlapping == 0 {
            return Err(GeometryError::NoOverlap {
                regions: regions.len(),
            });
        }

        Ok(MaskSet { entries })
    }

    /// Mask for a single region, without the overlap bookkeeping.
    pub fn rasterize(region: &Region, grid: &GridAxes) -> Mask {
        Self::rasterize_geometry(&to_raster_convention(region.geometry()), grid)
    }

    fn rasterize_geometry(geometry: &MultiPolygon, grid: &GridAxes) -> Mask {
        let (rows, cols) = grid.shape();
        let bounds = geometry.bbox();
        let mut cells = vec![false; rows * cols];
        if cols == 0 {
            return Mask { rows, cols, cells };
        }

        cells
            .par_chunks_mut(cols)
            .zip(grid.latitude.par_iter())
            .for_each(|(row, &lat)| {
                if lat < bounds.min_lat || lat > bounds.max_lat {
                    return;
                }
                for (cell, &lon) in row.iter_mut().zip(&grid.longitude) {
                    *cell = bounds.contains_point(lon, lat) && geometry.contains(lon, lat);
                }
            });

        Mask { rows, cols, cells }
    }
}

fn to_raster_convention(geometry: &MultiPolygon) -> MultiPolygon {
    if geometry.bbox().min_lon < 0.0 {
        geometry.translate_lon(RASTER_LON_SHIFT)
    } else {
        geometry.clone()
    }
}

fn grid_bbox(grid: &GridAxes) -> Option<BoundingBox> {
    let lats = grid.latitude.iter().copied();
    let lons = grid.longitude.iter().copied();
    let (min_lat, max_lat) = min_max(lats)?;
    let (min_lon, max_lon) = min_max(lons)?;
    Some(BoundingBox::new(min_lon, min_lat, max_lon, max_lat))
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
