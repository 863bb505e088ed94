//! Fixed-size worker pool running one extraction per file.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use series_common::ConfigError;
use snapshot_reader::{RasterReader, ReadError};
use tracing::{debug, info};

use crate::worker::{ExtractionWorker, RowValues, SnapshotExtractor};

/// Cooperative cancellation flag shared between the caller and a run.
///
/// Files not yet started when the token is cancelled are recorded as
/// skipped. Files already in flight finish normally.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Result of processing one input file, tagged with its input position.
#[derive(Debug)]
pub enum FileOutcome {
    Extracted {
        index: usize,
        path: PathBuf,
        timestamp: DateTime<Utc>,
        values: RowValues,
    },
    Failed {
        index: usize,
        path: PathBuf,
        error: ReadError,
    },
    Skipped {
        index: usize,
        path: PathBuf,
    },
}

impl FileOutcome {
    pub fn index(&self) -> usize {
        match self {
            Self::Extracted { index, .. }
            | Self::Failed { index, .. }
            | Self::Skipped { index, .. } => *index,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Extracted { path, .. }
            | Self::Failed { path, .. }
            | Self::Skipped { path, .. } => path,
        }
    }

    pub fn is_extracted(&self) -> bool {
        matches!(self, Self::Extracted { .. })
    }
}

/// Data-parallel executor over a file list.
///
/// Every file is handed to exactly one task. Tasks share the reader and the
/// extractor by reference and write only their own outcome slot, so the
/// result vector is in input order regardless of completion order.
pub struct ParallelExecutor {
    pool: ThreadPool,
    cancel: CancelToken,
}

impl ParallelExecutor {
    pub fn new(workers: usize) -> Result<Self, ConfigError> {
        if workers == 0 {
            return Err(ConfigError::invalid_setting("workers", "must be > 0"));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("series-worker-{}", i))
            .build()
            .map_err(|e| ConfigError::ThreadPool(e.to_string()))?;

        Ok(Self {
            pool,
            cancel: CancelToken::new(),
        })
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `extractor` over every file. One outcome per file, in input order.
    pub fn run<R, E>(&self, files: &[PathBuf], reader: &R, extractor: &E) -> Vec<FileOutcome>
    where
        R: RasterReader + ?Sized,
        E: SnapshotExtractor + ?Sized,
    {
        let worker = ExtractionWorker::new(reader, extractor);
        let cancel = &self.cancel;

        info!(files = files.len(), workers = self.workers(), "Starting extraction");

        self.pool.install(|| {
            files
                .par_iter()
                .enumerate()
                .map(|(index, path)| {
                    if cancel.is_cancelled() {
                        debug!(index, path = %path.display(), "Cancelled before start");
                        return FileOutcome::Skipped {
                            index,
                            path: path.clone(),
                        };
                    }
                    worker.process(index, path)
                })
                .collect()
        })
    }
}
