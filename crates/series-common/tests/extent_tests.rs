//! Extent resolution against realistic MRMS-style grids.

use series_common::{
    AxisOrder, ClipWindow, ConfigError, Extent, GridAxes, GridField, MultiPolygon, RegionSet,
};

/// 0.01° MRMS CONUS sub-grid: latitude north to south, longitude 0..360.
fn mrms_subgrid(rows: usize, cols: usize) -> GridAxes {
    let latitude = (0..rows).map(|i| 42.005 - i as f64 * 0.01).collect();
    let longitude = (0..cols).map(|j| 271.995 + j as f64 * 0.01).collect();
    GridAxes::new(latitude, longitude)
}

// ============================================================================
// Normalization
// ============================================================================

#[test]
fn test_extent_all_orderings_equal() {
    let lats = [(41.9, 41.6), (41.6, 41.9)];
    let lons = [(-88.0, -87.5), (-87.5, -88.0)];

    let reference = Extent::new(lats[0], lons[0]).unwrap();
    for lat in lats {
        for lon in lons {
            assert_eq!(Extent::new(lat, lon).unwrap(), reference);
        }
    }
    assert!(reference.up_lat() >= reference.down_lat());
    assert!(reference.left_lon() <= reference.right_lon());
}

#[test]
fn test_extent_contains_edges() {
    let e = Extent::new((39.0, 41.0), (-90.0, -88.0)).unwrap();
    assert!(e.contains(39.0, -90.0));
    assert!(e.contains(40.0, -89.0));
    assert!(!e.contains(42.0, -89.0));
    assert!(!e.contains(40.0, -87.5));
}

// ============================================================================
// Clip windows
// ============================================================================

#[test]
fn test_clip_window_on_descending_latitude() {
    let grid = mrms_subgrid(50, 50);
    assert_eq!(grid.lat_order(), AxisOrder::Descending);
    assert_eq!(grid.lon_order(), AxisOrder::Ascending);

    let extent = Extent::new((41.9, 41.8), (-87.9, -87.8)).unwrap();
    let window: ClipWindow = extent.clip_window(&grid).unwrap();
    assert!(window.latitude.start > window.latitude.stop);
    assert!(window.longitude.start < window.longitude.stop);

    let clipped = window.apply(&grid).unwrap();
    assert_eq!(clipped.shape(), (10, 10));
    assert!(clipped.latitude.iter().all(|&lat| (41.8..=41.9).contains(&lat)));
    assert!(clipped
        .longitude
        .iter()
        .all(|&lon| (272.1..=272.2).contains(&lon)));
}

#[test]
fn test_clip_field_matches_window_shape() {
    let grid = mrms_subgrid(20, 30);
    let values: Vec<f32> = (0..600).map(|v| v as f32).collect();
    let field = GridField::new(grid.clone(), values).unwrap();

    let extent = Extent::new((41.95, 41.9), (-87.99, -87.9)).unwrap();
    let window = extent.clip_window(&grid).unwrap();
    let clipped = field.clip(&window);

    assert_eq!(clipped.grid(), &window.apply(&grid).unwrap());
    let (rows, cols) = clipped.shape();
    assert_eq!(clipped.values().len(), rows * cols);
}

#[test]
fn test_extent_outside_grid_is_empty_window() {
    let grid = mrms_subgrid(10, 10);
    let extent = Extent::new((30.0, 31.0), (-87.99, -87.9)).unwrap();
    let window = extent.clip_window(&grid).unwrap();
    assert_eq!(
        window.apply(&grid),
        Err(ConfigError::EmptyWindow { axis: "latitude" })
    );
}

#[test]
fn test_region_extent_feeds_clip() {
    let regions = RegionSet::from_geometries(vec![MultiPolygon::from_wkt(
        "POLYGON((-87.98 41.96, -87.95 41.96, -87.95 41.99, -87.98 41.99, -87.98 41.96))",
    )
    .unwrap()])
    .unwrap();

    let grid = mrms_subgrid(10, 10);
    let window = regions.extent().unwrap().clip_window(&grid).unwrap();
    let clipped = window.apply(&grid).unwrap();
    assert_eq!(clipped.shape(), (3, 3));
}
