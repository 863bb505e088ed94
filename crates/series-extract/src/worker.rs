//! Per-file extraction.

use std::path::Path;

use snapshot_reader::{RasterReader, ReadError, Snapshot};
use tracing::{debug, warn};

use crate::executor::FileOutcome;

/// Column id and value pairs for one snapshot, in column order.
pub type RowValues = Vec<(String, Option<f64>)>;

/// Reduces one decoded snapshot to a row of values.
///
/// Implemented by [`ExtractionPlan`](crate::ExtractionPlan) for region means
/// and by [`PointProbe`](crate::PointProbe) for single-point series.
pub trait SnapshotExtractor: Send + Sync {
    fn extract(&self, snapshot: &Snapshot, path: &Path) -> Result<RowValues, ReadError>;
}

/// Reads one file and applies the shared extractor to it.
///
/// Holds only borrows: the reader and the extractor are shared by every task
/// in the pool.
pub struct ExtractionWorker<'a, R: ?Sized, E: ?Sized> {
    reader: &'a R,
    extractor: &'a E,
}

impl<'a, R, E> ExtractionWorker<'a, R, E>
where
    R: RasterReader + ?Sized,
    E: SnapshotExtractor + ?Sized,
{
    pub fn new(reader: &'a R, extractor: &'a E) -> Self {
        Self { reader, extractor }
    }

    /// Process the file at position `index` of the input list.
    ///
    /// Never fails: read and extraction errors become
    /// [`FileOutcome::Failed`] for this file only.
    pub fn process(&self, index: usize, path: &Path) -> FileOutcome {
        let result = self
            .reader
            .read(path)
            .and_then(|snapshot| {
                let values = self.extractor.extract(&snapshot, path)?;
                Ok((snapshot.timestamp(), values))
            });

        match result {
            Ok((timestamp, values)) => {
                debug!(index, path = %path.display(), %timestamp, "Extracted snapshot");
                FileOutcome::Extracted {
                    index,
                    path: path.to_path_buf(),
                    timestamp,
                    values,
                }
            }
            Err(error) => {
                warn!(
                    index,
                    path = %path.display(),
                    error = %error,
                    "Skipping unreadable snapshot"
                );
                FileOutcome::Failed {
                    index,
                    path: path.to_path_buf(),
                    error,
                }
            }
        }
    }
}
