//! Time series assembly from per-file outcomes.

use std::collections::HashMap;
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use snapshot_reader::ReadError;
use tracing::info;

use crate::executor::FileOutcome;

/// One timestamp and one value per series column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesRow {
    pub timestamp: DateTime<Utc>,
    /// Aligned with [`Series::columns`]. `None` is a missing value.
    pub values: Vec<Option<f64>>,
}

/// Rows sorted ascending by timestamp, with a fixed column list.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Series {
    columns: Vec<String>,
    rows: Vec<SeriesRow>,
}

impl Series {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[SeriesRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.rows.iter().map(|r| r.timestamp).collect()
    }

    /// All values of one column in row order.
    pub fn column(&self, id: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.columns.iter().position(|c| c == id)?;
        Some(self.rows.iter().map(|r| r.values[idx]).collect())
    }

    /// Write as CSV: a `timestamp` column (RFC 3339, UTC) followed by one
    /// column per id. Missing values are empty fields.
    pub fn write_csv<W: Write>(&self, mut writer: W) -> io::Result<()> {
        write!(writer, "timestamp")?;
        for column in &self.columns {
            write!(writer, ",{}", csv_field(column))?;
        }
        writeln!(writer)?;

        for row in &self.rows {
            write!(
                writer,
                "{}",
                row.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
            )?;
            for value in &row.values {
                match value {
                    Some(v) => write!(writer, ",{}", v)?,
                    None => write!(writer, ",")?,
                }
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn csv_field(field: &str) -> String {
    if field.contains(|c: char| matches!(c, ',' | '"' | '\n')) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// An input file that produced no row.
#[derive(Debug)]
pub struct FailedFile {
    pub index: usize,
    pub path: PathBuf,
    pub error: ReadError,
}

/// An input file that was never started because the run was cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub index: usize,
    pub path: PathBuf,
}

/// Terminal artifact of a run.
#[derive(Debug, Default)]
pub struct SeriesReport {
    pub series: Series,
    /// Sorted by input index.
    pub failed: Vec<FailedFile>,
    /// Sorted by input index.
    pub skipped: Vec<SkippedFile>,
}

impl SeriesReport {
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Merges per-file outcomes into a [`SeriesReport`].
pub struct SeriesAssembler;

impl SeriesAssembler {
    /// Sort rows by (timestamp, input index) and align them on the union of
    /// observed column ids, in first-seen order. Ids a row lacks are filled
    /// with `None`.
    pub fn assemble(outcomes: Vec<FileOutcome>) -> SeriesReport {
        let mut extracted = Vec::new();
        let mut failed = Vec::new();
        let mut skipped = Vec::new();

        for outcome in outcomes {
            match outcome {
                FileOutcome::Extracted {
                    index,
                    timestamp,
                    values,
                    ..
                } => extracted.push((timestamp, index, values)),
                FileOutcome::Failed { index, path, error } => {
                    failed.push(FailedFile { index, path, error })
                }
                FileOutcome::Skipped { index, path } => skipped.push(SkippedFile { index, path }),
            }
        }

        extracted.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        failed.sort_by_key(|f| f.index);
        skipped.sort_by_key(|s| s.index);

        let mut columns: Vec<String> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        for (_, _, values) in &extracted {
            for (id, _) in values {
                if !positions.contains_key(id) {
                    positions.insert(id.clone(), columns.len());
                    columns.push(id.clone());
                }
            }
        }

        let rows = extracted
            .into_iter()
            .map(|(timestamp, _, values)| {
                let mut aligned = vec![None; columns.len()];
                for (id, value) in values {
                    if let Some(&pos) = positions.get(&id) {
                        aligned[pos] = value;
                    }
                }
                SeriesRow {
                    timestamp,
                    values: aligned,
                }
            })
            .collect();

        let report = SeriesReport {
            series: Series { columns, rows },
            failed,
            skipped,
        };

        info!(
            rows = report.series.len(),
            columns = report.series.columns().len(),
            failed = report.failed_count(),
            skipped = report.skipped_count(),
            "Assembled series"
        );

        report
    }
}
