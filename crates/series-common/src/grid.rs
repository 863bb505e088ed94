//! Rectilinear lat/lon grids.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::GridError;
use crate::extent::ClipWindow;

/// Stored direction of a coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisOrder {
    Ascending,
    Descending,
}

impl AxisOrder {
    /// Inspect an axis. Single-element and empty axes count as ascending.
    pub fn of(values: &[f64]) -> Self {
        match (values.first(), values.last()) {
            (Some(first), Some(last)) if first > last => Self::Descending,
            _ => Self::Ascending,
        }
    }
}

/// Coordinate vectors of a regular lat/lon grid.
///
/// Rows follow `latitude`, columns follow `longitude`, each in the order the
/// source stored them. Raster longitudes are expected in 0..360.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridAxes {
    pub latitude: Vec<f64>,
    pub longitude: Vec<f64>,
}

impl GridAxes {
    pub fn new(latitude: Vec<f64>, longitude: Vec<f64>) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.latitude.len(), self.longitude.len())
    }

    /// Total number of grid points.
    pub fn len(&self) -> usize {
        self.latitude.len() * self.longitude.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latitude.is_empty() || self.longitude.is_empty()
    }

    pub fn lat_order(&self) -> AxisOrder {
        AxisOrder::of(&self.latitude)
    }

    pub fn lon_order(&self) -> AxisOrder {
        AxisOrder::of(&self.longitude)
    }

    /// Two grids are compatible iff they have identical shape and values.
    pub fn is_compatible(&self, other: &GridAxes) -> bool {
        self == other
    }

    /// Check that both axes are non-empty and strictly monotonic.
    pub fn validate(&self) -> Result<(), GridError> {
        validate_axis("latitude", &self.latitude)?;
        validate_axis("longitude", &self.longitude)
    }

    /// Index ranges of the rows and columns selected by a clip window.
    pub fn clip_ranges(&self, window: &ClipWindow) -> (Range<usize>, Range<usize>) {
        (
            window.latitude.select(&self.latitude),
            window.longitude.select(&self.longitude),
        )
    }
}

fn validate_axis(axis: &'static str, values: &[f64]) -> Result<(), GridError> {
    if values.is_empty() {
        return Err(GridError::EmptyAxis { axis });
    }
    let order = AxisOrder::of(values);
    for (index, pair) in values.windows(2).enumerate() {
        let ok = match order {
            AxisOrder::Ascending => pair[0] < pair[1],
            AxisOrder::Descending => pair[0] > pair[1],
        };
        if !ok {
            return Err(GridError::NotMonotonic {
                axis,
                index: index + 1,
            });
        }
    }
    Ok(())
}

/// Index of the coordinate nearest to `value` on a monotonic axis.
///
/// Returns `None` for an empty axis or a value outside the axis range.
/// Equidistant ties resolve to the lower index.
pub fn nearest_index(axis: &[f64], value: f64) -> Option<usize> {
    let (first, last) = (*axis.first()?, *axis.last()?);
    if value < first.min(last) || value > first.max(last) || value.is_nan() {
        return None;
    }

    // Position of the first coordinate at or past `value` in stored order.
    let upper = match AxisOrder::of(axis) {
        AxisOrder::Ascending => axis.partition_point(|&c| c < value),
        AxisOrder::Descending => axis.partition_point(|&c| c > value),
    };
    if upper == 0 {
        return Some(0);
    }
    if upper >= axis.len() {
        return Some(axis.len() - 1);
    }

    let below = (value - axis[upper - 1]).abs();
    let above = (axis[upper] - value).abs();
    Some(if above < below { upper } else { upper - 1 })
}

/// A grid plus its values in row-major order (row = latitude index).
#[derive(Debug, Clone, PartialEq)]
pub struct GridField {
    grid: GridAxes,
    values: Vec<f32>,
}

impl GridField {
    /// Create a field, validating axes and value count.
    pub fn new(grid: GridAxes, values: Vec<f32>) -> Result<Self, GridError> {
        grid.validate()?;
        let (rows, cols) = grid.shape();
        if values.len() != rows * cols {
            return Err(GridError::ShapeMismatch {
                rows,
                cols,
                expected: rows * cols,
                found: values.len(),
            });
        }
        Ok(Self { grid, values })
    }

    pub fn grid(&self) -> &GridAxes {
        &self.grid
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn shape(&self) -> (usize, usize) {
        self.grid.shape()
    }

    /// Value at (row, col), if in range.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        let (rows, cols) = self.shape();
        if row >= rows || col >= cols {
            return None;
        }
        Some(self.values[row * cols + col])
    }

    /// Sub-field selected by a clip window. Either axis may end up empty.
    pub fn clip(&self, window: &ClipWindow) -> GridField {
        let (rows, cols) = self.grid.clip_ranges(window);
        let width = self.grid.longitude.len();

        let mut values = Vec::with_capacity(rows.len() * cols.len());
        for row in rows.clone() {
            let start = row * width;
            values.extend_from_slice(&self.values[start + cols.start..start + cols.end]);
        }

        GridField {
            grid: GridAxes::new(
                self.grid.latitude[rows].to_vec(),
                self.grid.longitude[cols].to_vec(),
            ),
            values,
        }
    }

    pub fn into_parts(self) -> (GridAxes, Vec<f32>) {
        (self.grid, self.values)
    }
}
