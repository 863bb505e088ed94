//! Grid densification and nearest-neighbour resampling.
//!
//! A clipped grid of `N` points per axis is densified to `factor * N - 1`
//! evenly spaced points spanning the same min..max range. Each dense
//! coordinate is then mapped once to its nearest native coordinate, so
//! resampling a snapshot is a pure gather through two index maps.

use series_common::{nearest_index, ConfigError, GridAxes};

/// Default densification factor.
pub const DEFAULT_UPSAMPLE_FACTOR: usize = 4;

/// Densifies coordinate axes by a fixed factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSampler {
    factor: usize,
}

impl Default for GridSampler {
    fn default() -> Self {
        Self {
            factor: DEFAULT_UPSAMPLE_FACTOR,
        }
    }
}

impl GridSampler {
    pub fn new(factor: usize) -> Result<Self, ConfigError> {
        if factor < 2 {
            return Err(ConfigError::invalid_setting(
                "upsample_factor",
                format!("must be >= 2, got {}", factor),
            ));
        }
        Ok(Self { factor })
    }

    pub fn factor(&self) -> usize {
        self.factor
    }

    /// Evenly spaced ascending axis from the minimum to the maximum of
    /// `axis`, with `factor * axis.len() - 1` points. Both end points are
    /// reproduced exactly.
    pub fn densify_axis(&self, axis: &[f64]) -> Vec<f64> {
        if axis.is_empty() {
            return Vec::new();
        }
        let min = axis.iter().copied().fold(f64::INFINITY, f64::min);
        let max = axis.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        linspace(min, max, self.factor * axis.len() - 1)
    }

    /// Densify both axes of `grid` and precompute the index maps back onto it.
    pub fn densify(&self, grid: &GridAxes) -> DenseGrid {
        let dense = GridAxes::new(
            self.densify_axis(&grid.latitude),
            self.densify_axis(&grid.longitude),
        );
        let row_map = index_map(&dense.latitude, &grid.latitude);
        let col_map = index_map(&dense.longitude, &grid.longitude);

        DenseGrid {
            native_shape: grid.shape(),
            grid: dense,
            row_map,
            col_map,
        }
    }
}

/// A densified grid plus the nearest-native index of every dense row/column.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseGrid {
    grid: GridAxes,
    native_shape: (usize, usize),
    row_map: Vec<usize>,
    col_map: Vec<usize>,
}

impl DenseGrid {
    pub fn grid(&self) -> &GridAxes {
        &self.grid
    }

    pub fn shape(&self) -> (usize, usize) {
        self.grid.shape()
    }

    /// Shape of the grid this was densified from.
    pub fn native_shape(&self) -> (usize, usize) {
        self.native_shape
    }

    pub fn row_map(&self) -> &[usize] {
        &self.row_map
    }

    pub fn col_map(&self) -> &[usize] {
        &self.col_map
    }

    /// Gather row-major native values onto the dense grid.
    ///
    /// `native` must have `native_shape()` elements.
    pub fn resample(&self, native: &[f32]) -> Vec<f32> {
        let native_cols = self.native_shape.1;
        let mut out = Vec::with_capacity(self.row_map.len() * self.col_map.len());
        for &row in &self.row_map {
            let offset = row * native_cols;
            out.extend(self.col_map.iter().map(|&col| native[offset + col]));
        }
        out
    }
}

fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut values: Vec<f64> = (0..n)
                .map(|i| (start + step * i as f64).min(stop))
                .collect();
            values[n - 1] = stop;
            values
        }
    }
}

fn index_map(dense: &[f64], native: &[f64]) -> Vec<usize> {
    // Dense coordinates lie within the native range by construction.
    dense
        .iter()
        .map(|&c| nearest_index(native, c).unwrap_or(0))
        .collect()
}
