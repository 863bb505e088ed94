//! Test data generators for synthetic precipitation grids.
//!
//! These generators create predictable, verifiable test data patterns
//! on axes shaped like the MRMS CONUS grid (latitude north to south,
//! longitude in 0..360).

use chrono::{DateTime, Duration, TimeZone, Utc};
use series_common::GridAxes;

/// MRMS grid spacing in degrees.
pub const MRMS_STEP: f64 = 0.01;

/// Latitude of the first row of [`mrms_axes`].
pub const MRMS_NORTH: f64 = 42.005;

/// Raster longitude of the first column of [`mrms_axes`].
pub const MRMS_WEST: f64 = 271.995;

/// Sub-grid of the MRMS CONUS grid around Chicago.
///
/// Latitude runs `42.005, 41.995, ...` (descending), longitude runs
/// `271.995, 272.005, ...` (ascending, raster convention). Cell centers sit
/// on odd thousandths so polygon edges on round hundredths never touch them.
///
/// # Example
///
/// ```
/// use test_utils::mrms_axes;
///
/// let grid = mrms_axes(3, 4);
/// assert_eq!(grid.shape(), (3, 4));
/// assert!(grid.latitude[0] > grid.latitude[1]);
/// ```
pub fn mrms_axes(rows: usize, cols: usize) -> GridAxes {
    GridAxes::new(
        (0..rows).map(|i| MRMS_NORTH - i as f64 * MRMS_STEP).collect(),
        (0..cols).map(|j| MRMS_WEST + j as f64 * MRMS_STEP).collect(),
    )
}

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[1], 1000.0); // col=1, row=0
/// assert_eq!(grid[10], 1.0);   // col=0, row=1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Constant-valued grid.
pub fn create_constant_grid(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// Precipitation-rate-like field in mm/h.
///
/// A single storm cell centered on the grid: up to `peak` in the middle,
/// decaying to zero towards the edges.
pub fn create_storm_grid(width: usize, height: usize, peak: f32) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;
    let radius = center_x.min(center_y).max(1.0);

    for row in 0..height {
        for col in 0..width {
            let dx = col as f32 - center_x;
            let dy = row as f32 - center_y;
            let dist = (dx * dx + dy * dy).sqrt() / radius;
            data.push((peak * (1.0 - dist)).max(0.0));
        }
    }
    data
}

/// Replace every `every`-th cell with NaN (missing).
pub fn with_missing(mut data: Vec<f32>, every: usize) -> Vec<f32> {
    if every > 0 {
        for value in data.iter_mut().step_by(every) {
            *value = f32::NAN;
        }
    }
    data
}

/// `count` timestamps at the MRMS 2-minute cadence starting at `start`.
pub fn mrms_timestamps(start: DateTime<Utc>, count: usize) -> Vec<DateTime<Utc>> {
    (0..count)
        .map(|i| start + Duration::minutes(2 * i as i64))
        .collect()
}

/// 2024-05-02 12:00:00 UTC.
pub fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap()
}
