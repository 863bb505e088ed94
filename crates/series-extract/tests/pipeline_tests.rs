//! End-to-end series extraction over JSON snapshot fixtures.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use series_common::{ConfigError, Extent, GeometryError, Region, RegionSet};
use series_extract::{CancelToken, ExtractionConfig, PipelineError, SeriesExtractor};
use snapshot_reader::{JsonSnapshotDecoder, ReadError, ReaderConfig, SnapshotReader};
use test_utils::{
    assert_some_approx_eq, bbox, bbox_wkt, create_constant_grid, create_storm_grid,
    create_test_grid, init_tracing, mrms_axes, mrms_file_name, mrms_timestamps, reference_time,
    with_missing, SnapshotDir,
};

const ROWS: usize = 20;
const COLS: usize = 20;

/// Exactly one cell center inside: row 5 (lat 41.955), col 5 (lon -87.955).
const ONE_CELL: &str =
    "POLYGON((-87.96 41.95, -87.95 41.95, -87.95 41.96, -87.96 41.96, -87.96 41.95))";

/// Covers the whole 20x20 fixture grid.
const WHOLE_GRID: &str =
    "POLYGON((-88.1 41.7, -87.7 41.7, -87.7 42.1, -88.1 42.1, -88.1 41.7))";

type Extractor = SeriesExtractor<SnapshotReader<JsonSnapshotDecoder>>;

fn extractor(workers: usize) -> Extractor {
    SeriesExtractor::new(
        SnapshotReader::new(JsonSnapshotDecoder, ReaderConfig::default()),
        ExtractionConfig::default().with_workers(workers),
    )
}

fn regions(entries: &[(&str, &str)]) -> RegionSet {
    RegionSet::new(
        entries
            .iter()
            .map(|(id, wkt)| Region::from_wkt(*id, wkt).unwrap())
            .collect(),
    )
    .unwrap()
}

/// One plain file per timestamp, all with the same values.
fn constant_files(dir: &SnapshotDir, times: &[DateTime<Utc>], value: f32) -> Vec<PathBuf> {
    let grid = mrms_axes(ROWS, COLS);
    let values = create_constant_grid(COLS, ROWS, value);
    times
        .iter()
        .map(|&t| dir.write_plain(&mrms_file_name(t, false), t, &grid, &values))
        .collect()
}

// ============================================================================
// Three-file series
// ============================================================================

#[test]
fn test_three_files_constant_region() {
    init_tracing();
    let dir = SnapshotDir::new();
    let times = mrms_timestamps(reference_time(), 3);
    let files = constant_files(&dir, &times, 2.5);
    let set = regions(&[("cell", ONE_CELL)]);

    // Input order must not matter.
    for order in [[0, 1, 2], [2, 0, 1], [1, 2, 0]] {
        let input: Vec<PathBuf> = order.iter().map(|&i| files[i].clone()).collect();
        let report = extractor(2).multipolygon_series(&input, &set).unwrap();

        assert_eq!(report.failed_count(), 0);
        assert_eq!(report.series.timestamps(), times);
        assert_eq!(
            report.series.column("cell").unwrap(),
            vec![Some(2.5), Some(2.5), Some(2.5)]
        );
    }
}

#[test]
fn test_unreadable_middle_file_is_reported() {
    let dir = SnapshotDir::new();
    let times = mrms_timestamps(reference_time(), 3);
    let mut files = constant_files(&dir, &times, 2.5);
    files[1] = dir.write_unreadable(&mrms_file_name(times[1], false));
    let set = regions(&[("cell", ONE_CELL)]);

    let report = extractor(3).multipolygon_series(&files, &set).unwrap();

    assert_eq!(report.series.timestamps(), vec![times[0], times[2]]);
    assert_eq!(
        report.series.column("cell").unwrap(),
        vec![Some(2.5), Some(2.5)]
    );
    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.failed[0].index, 1);
    assert_eq!(report.failed[0].path, files[1]);
    assert!(matches!(report.failed[0].error, ReadError::Decode { .. }));
}

#[test]
fn test_missing_file_is_reported() {
    let dir = SnapshotDir::new();
    let times = mrms_timestamps(reference_time(), 2);
    let mut files = constant_files(&dir, &times, 1.0);
    files.push(dir.missing("gone.json"));
    let set = regions(&[("cell", ONE_CELL)]);

    let report = extractor(2).multipolygon_series(&files, &set).unwrap();
    assert_eq!(report.series.len(), 2);
    assert_eq!(report.failed_count(), 1);
    assert!(matches!(report.failed[0].error, ReadError::Open { .. }));
}

// ============================================================================
// Mask coverage
// ============================================================================

#[test]
fn test_region_covering_extent_equals_unmasked_mean() {
    let dir = SnapshotDir::new();
    let grid = mrms_axes(ROWS, COLS);
    let t = reference_time();
    let files = vec![dir.write_plain("a.json", t, &grid, &create_test_grid(COLS, ROWS))];

    // Rows 6..=10 and cols 6..=10 of the fixture grid.
    let extent = Extent::new((41.95, 41.9), (-87.95, -87.9)).unwrap();
    let report = extractor(1)
        .with_extent(extent)
        .multipolygon_series(&files, &regions(&[("all", WHOLE_GRID)]))
        .unwrap();

    // Cell value is col * 1000 + row, so the mean is 8 * 1000 + 8.
    let value = report.series.column("all").unwrap()[0];
    assert_some_approx_eq!(value, 8008.0, 1e-9);
}

#[test]
fn test_region_outside_grid_is_all_missing() {
    let dir = SnapshotDir::new();
    let times = mrms_timestamps(reference_time(), 3);
    let files = constant_files(&dir, &times, 4.0);
    let sea = bbox_wkt(bbox::OFFSHORE);
    let set = regions(&[("cell", ONE_CELL), ("sea", sea.as_str())]);

    let report = extractor(2).multipolygon_series(&files, &set).unwrap();

    assert_eq!(report.failed_count(), 0);
    assert_eq!(report.series.columns(), &["cell".to_string(), "sea".to_string()]);
    assert_eq!(report.series.column("sea").unwrap(), vec![None, None, None]);
    assert_eq!(
        report.series.column("cell").unwrap(),
        vec![Some(4.0), Some(4.0), Some(4.0)]
    );
}

#[test]
fn test_no_region_overlaps_grid() {
    let dir = SnapshotDir::new();
    let files = constant_files(&dir, &[reference_time()], 1.0);
    let extent = Extent::new((41.9, 41.95), (-87.95, -87.9)).unwrap();
    let sea = bbox_wkt(bbox::OFFSHORE);

    let err = extractor(1)
        .with_extent(extent)
        .multipolygon_series(&files, &regions(&[("sea", sea.as_str())]))
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Geometry(GeometryError::NoOverlap { regions: 1 })
    ));
}

#[test]
fn test_all_missing_cells_yield_none() {
    let dir = SnapshotDir::new();
    let grid = mrms_axes(ROWS, COLS);
    let t = reference_time();
    let files = vec![dir.write_plain(
        "a.json",
        t,
        &grid,
        &with_missing(create_constant_grid(COLS, ROWS, 1.0), 1),
    )];

    let report = extractor(1)
        .multipolygon_series(&files, &regions(&[("cell", ONE_CELL)]))
        .unwrap();
    assert_eq!(report.failed_count(), 0);
    assert_eq!(report.series.column("cell").unwrap(), vec![None]);
}

#[test]
fn test_geographic_and_shifted_polygons_agree() {
    let dir = SnapshotDir::new();
    let grid = mrms_axes(ROWS, COLS);
    let times = mrms_timestamps(reference_time(), 2);
    let files: Vec<PathBuf> = times
        .iter()
        .enumerate()
        .map(|(i, &t)| {
            let values = create_storm_grid(COLS, ROWS, 10.0 + i as f32);
            dir.write_plain(&mrms_file_name(t, false), t, &grid, &values)
        })
        .collect();

    let geographic = regions(&[(
        "r",
        "POLYGON((-87.97 41.85, -87.86 41.85, -87.86 41.97, -87.97 41.97, -87.97 41.85))",
    )]);
    let shifted = regions(&[(
        "r",
        "POLYGON((272.03 41.85, 272.14 41.85, 272.14 41.97, 272.03 41.97, 272.03 41.85))",
    )]);

    let a = extractor(2).multipolygon_series(&files, &geographic).unwrap();
    let b = extractor(2).multipolygon_series(&files, &shifted).unwrap();
    assert_eq!(a.series, b.series);
    assert!(a.series.column("r").unwrap().iter().all(Option::is_some));
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_serialized_series_identical_across_orders_and_pools() {
    let dir = SnapshotDir::new();
    let grid = mrms_axes(ROWS, COLS);
    let times = mrms_timestamps(reference_time(), 12);
    let files: Vec<PathBuf> = times
        .iter()
        .enumerate()
        .map(|(i, &t)| {
            let values = with_missing(create_storm_grid(COLS, ROWS, i as f32 * 1.7), 7);
            dir.write_plain(&mrms_file_name(t, false), t, &grid, &values)
        })
        .collect();
    let sea = bbox_wkt(bbox::OFFSHORE);
    let set = regions(&[("cell", ONE_CELL), ("all", WHOLE_GRID), ("sea", sea.as_str())]);

    let baseline = extractor(1)
        .multipolygon_series(&files, &set)
        .unwrap()
        .series
        .to_json()
        .unwrap();

    let mut permuted = files.clone();
    permuted.reverse();
    permuted.swap(0, 5);

    for (workers, input) in [(4, &files), (1, &permuted), (4, &permuted), (3, &files)] {
        let json = extractor(workers)
            .multipolygon_series(input, &set)
            .unwrap()
            .series
            .to_json()
            .unwrap();
        assert_eq!(json, baseline);
    }
}

// ============================================================================
// Upsampling
// ============================================================================

#[test]
fn test_upsampled_constant_field_keeps_value() {
    let dir = SnapshotDir::new();
    let files = constant_files(&dir, &mrms_timestamps(reference_time(), 2), 3.25);
    let extent = Extent::new((41.9, 41.95), (-87.95, -87.9)).unwrap();

    let report = SeriesExtractor::new(
        SnapshotReader::new(JsonSnapshotDecoder, ReaderConfig::default()),
        ExtractionConfig::default().with_workers(2).with_upsample(true),
    )
    .with_extent(extent)
    .multipolygon_series(&files, &regions(&[("all", WHOLE_GRID)]))
    .unwrap();

    assert_eq!(
        report.series.column("all").unwrap(),
        vec![Some(3.25), Some(3.25)]
    );
}

#[test]
fn test_upsampling_narrow_region_catches_subcell() {
    // A polygon narrower than one native cell contains no native center but
    // does contain densified points.
    let dir = SnapshotDir::new();
    let files = constant_files(&dir, &[reference_time()], 5.0);
    let sliver = "POLYGON((-87.9520 41.9520, -87.9480 41.9520, -87.9480 41.9580, -87.9520 41.9580, -87.9520 41.9520))";
    let extent = Extent::new((41.93, 41.98), (-87.98, -87.93)).unwrap();

    let native = extractor(1)
        .with_extent(extent)
        .multipolygon_series(&files, &regions(&[("s", sliver)]))
        .unwrap();
    assert_eq!(native.series.column("s").unwrap(), vec![None]);

    let dense = SeriesExtractor::new(
        SnapshotReader::new(JsonSnapshotDecoder, ReaderConfig::default()),
        ExtractionConfig::default().with_workers(1).with_upsample(true),
    )
    .with_extent(extent)
    .multipolygon_series(&files, &regions(&[("s", sliver)]))
    .unwrap();
    assert_eq!(dense.series.column("s").unwrap(), vec![Some(5.0)]);
}

// ============================================================================
// Compressed inputs
// ============================================================================

#[test]
fn test_gzip_inputs_match_plain_and_leave_no_scratch() {
    let dir = SnapshotDir::new();
    let scratch = tempfile::tempdir().unwrap();
    let grid = mrms_axes(ROWS, COLS);
    let times = mrms_timestamps(reference_time(), 4);

    let mut plain = Vec::new();
    let mut mixed = Vec::new();
    for (i, &t) in times.iter().enumerate() {
        let values = create_storm_grid(COLS, ROWS, 20.0 - i as f32);
        plain.push(dir.write_plain(&mrms_file_name(t, false), t, &grid, &values));
        mixed.push(if i % 2 == 0 {
            dir.write_gzip(&mrms_file_name(t, true), t, &grid, &values)
        } else {
            plain[i].clone()
        });
    }
    let set = regions(&[("all", WHOLE_GRID)]);

    let reader = SnapshotReader::new(
        JsonSnapshotDecoder,
        ReaderConfig::default().with_scratch_dir(scratch.path()),
    );
    let from_mixed = SeriesExtractor::new(reader, ExtractionConfig::default().with_workers(2))
        .multipolygon_series(&mixed, &set)
        .unwrap();
    let from_plain = extractor(2).multipolygon_series(&plain, &set).unwrap();

    assert_eq!(from_mixed.series, from_plain.series);
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[test]
fn test_missing_scratch_dir_is_fatal() {
    let dir = SnapshotDir::new();
    let grid = mrms_axes(ROWS, COLS);
    let values = create_constant_grid(COLS, ROWS, 1.0);
    let times = mrms_timestamps(reference_time(), 3);
    let files: Vec<PathBuf> = times
        .iter()
        .enumerate()
        .map(|(i, &t)| {
            let gzip = i > 0;
            let name = mrms_file_name(t, gzip);
            if gzip {
                dir.write_gzip(&name, t, &grid, &values)
            } else {
                dir.write_plain(&name, t, &grid, &values)
            }
        })
        .collect();

    let reader = SnapshotReader::new(
        JsonSnapshotDecoder,
        ReaderConfig::default().with_scratch_dir(dir.missing("scratch")),
    );
    let err = SeriesExtractor::new(reader, ExtractionConfig::default().with_workers(2))
        .multipolygon_series(&files, &regions(&[("cell", ONE_CELL)]))
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Config(ConfigError::InvalidSetting { name: "scratch_dir", .. })
    ));
}

// ============================================================================
// Point series
// ============================================================================

#[test]
fn test_point_series_nearest_cell() {
    let dir = SnapshotDir::new();
    let grid = mrms_axes(ROWS, COLS);
    let times = mrms_timestamps(reference_time(), 3);
    let mut files: Vec<PathBuf> = times
        .iter()
        .map(|&t| {
            let values = create_test_grid(COLS, ROWS);
            dir.write_plain(&mrms_file_name(t, false), t, &grid, &values)
        })
        .collect();
    files.reverse();

    // Nearest cell is row 3 (41.975), col 5 (272.045).
    let report = extractor(2).point_series(&files, 41.974, -87.956).unwrap();
    assert_eq!(report.series.columns(), &["value".to_string()]);
    assert_eq!(report.series.timestamps(), times);
    for value in report.series.column("value").unwrap() {
        assert_some_approx_eq!(value, 5003.0, 1e-9);
    }

    let outside = extractor(1).point_series(&files, 30.0, -87.956).unwrap();
    assert_eq!(outside.series.column("value").unwrap(), vec![None, None, None]);
}

// ============================================================================
// Fatal setup errors
// ============================================================================

#[test]
fn test_empty_file_list() {
    let err = extractor(1)
        .multipolygon_series(&[], &regions(&[("cell", ONE_CELL)]))
        .unwrap_err();
    assert!(matches!(err, PipelineError::Config(ConfigError::EmptyFileList)));

    let err = extractor(1).point_series(&[], 41.9, -87.9).unwrap_err();
    assert!(matches!(err, PipelineError::Config(ConfigError::EmptyFileList)));
}

#[test]
fn test_single_region_mode() {
    let dir = SnapshotDir::new();
    let files = constant_files(&dir, &mrms_timestamps(reference_time(), 2), 1.5);

    let report = extractor(1)
        .polygon_series(&files, &regions(&[("cell", ONE_CELL)]))
        .unwrap();
    assert_eq!(report.series.len(), 2);

    let err = extractor(1)
        .polygon_series(&files, &regions(&[("a", ONE_CELL), ("b", WHOLE_GRID)]))
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Config(ConfigError::RegionCount {
            expected: 1,
            found: 2
        })
    ));
}

#[test]
fn test_unreadable_reference_is_fatal() {
    let dir = SnapshotDir::new();
    let times = mrms_timestamps(reference_time(), 2);
    let mut files = constant_files(&dir, &times, 1.0);
    files[0] = dir.write_unreadable("first.json");

    let err = extractor(2)
        .multipolygon_series(&files, &regions(&[("cell", ONE_CELL)]))
        .unwrap_err();
    assert!(matches!(err, PipelineError::Reference(ReadError::Decode { .. })));
}

#[test]
fn test_invalid_config_is_fatal() {
    let dir = SnapshotDir::new();
    let files = constant_files(&dir, &[reference_time()], 1.0);
    let bad = SeriesExtractor::new(
        SnapshotReader::new(JsonSnapshotDecoder, ReaderConfig::default()),
        ExtractionConfig::default().with_workers(0),
    );
    assert!(matches!(
        bad.multipolygon_series(&files, &regions(&[("cell", ONE_CELL)])),
        Err(PipelineError::Config(ConfigError::InvalidSetting { name: "workers", .. }))
    ));
}

#[test]
fn test_cancelled_run_skips_files() {
    let dir = SnapshotDir::new();
    let files = constant_files(&dir, &mrms_timestamps(reference_time(), 5), 1.0);
    let token = CancelToken::new();
    token.cancel();

    let report = extractor(2)
        .with_cancel_token(token)
        .multipolygon_series(&files, &regions(&[("cell", ONE_CELL)]))
        .unwrap();
    assert!(report.series.is_empty());
    assert_eq!(report.skipped_count(), 5);
    assert_eq!(report.failed_count(), 0);
    assert_eq!(report.skipped[4].index, 4);
}
