//! Format-dispatching snapshot reader.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use flate2::read::GzDecoder;
use tempfile::NamedTempFile;
use series_common::ConfigError;
use tracing::{debug, instrument};

use crate::config::ReaderConfig;
use crate::error::{ReadError, Result};
use crate::format::SnapshotFormat;
use crate::snapshot::Snapshot;

/// Turns one snapshot file into a [`Snapshot`].
///
/// Implementations are shared across the worker pool.
pub trait RasterReader: Send + Sync {
    fn read(&self, path: &Path) -> Result<Snapshot>;

    /// Check reader settings before any file is read.
    fn validate(&self) -> std::result::Result<(), ConfigError> {
        Ok(())
    }
}

/// Raster codec for a plain (already decompressed) snapshot file.
pub trait SnapshotDecoder: Send + Sync {
    fn decode(&self, path: &Path) -> anyhow::Result<Snapshot>;
}

impl<F> SnapshotDecoder for F
where
    F: Fn(&Path) -> anyhow::Result<Snapshot> + Send + Sync,
{
    fn decode(&self, path: &Path) -> anyhow::Result<Snapshot> {
        self(path)
    }
}

/// [`RasterReader`] that dispatches on [`SnapshotFormat`] before decoding.
///
/// Gzip-wrapped files are streamed into a scratch file that lives only for
/// the duration of the decode. The scratch file is removed when it goes out
/// of scope, whether decoding succeeded or not.
#[derive(Debug, Clone)]
pub struct SnapshotReader<D> {
    decoder: D,
    config: ReaderConfig,
}

impl<D: SnapshotDecoder> SnapshotReader<D> {
    pub fn new(decoder: D, config: ReaderConfig) -> Self {
        Self { decoder, config }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    fn decode_plain(&self, path: &Path) -> Result<Snapshot> {
        if !path.is_file() {
            return Err(ReadError::Open {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            });
        }

        let snapshot = self.decoder.decode(path).map_err(|source| ReadError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        snapshot
            .grid()
            .validate()
            .map_err(|source| ReadError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(snapshot)
    }

    fn decode_gzip(&self, path: &Path) -> Result<Snapshot> {
        let scratch = decompress_gzip_to(path, self.config.scratch_dir.as_deref())?;
        debug!(
            source = %path.display(),
            scratch = %scratch.path().display(),
            "Decompressed snapshot"
        );

        // Errors name the original file, not the scratch copy.
        let snapshot = self.decode_plain(scratch.path()).map_err(|e| rename(e, path))?;
        drop(scratch);
        Ok(snapshot)
    }
}

impl<D: SnapshotDecoder> RasterReader for SnapshotReader<D> {
    fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.config.validate()
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    fn read(&self, path: &Path) -> Result<Snapshot> {
        let format = SnapshotFormat::detect(path);
        debug!(%format, "Reading snapshot");

        match format {
            SnapshotFormat::Plain => self.decode_plain(path),
            SnapshotFormat::GzipWrapped => self.decode_gzip(path),
        }
    }
}

/// Stream-decompress a gzip file into a new scratch file.
///
/// The scratch file keeps the inner extension (`x.grib2.gz` becomes
/// `snapshot-XXXX.grib2`) for decoders that sniff it, and is deleted when
/// the returned handle is dropped.
pub fn decompress_gzip_to(path: &Path, scratch_dir: Option<&Path>) -> Result<NamedTempFile> {
    let input = File::open(path).map_err(|source| ReadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let suffix = SnapshotFormat::inner_suffix(path);
    let mut builder = tempfile::Builder::new();
    builder.prefix("snapshot-").suffix(&suffix);
    let scratch = match scratch_dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    }
    .map_err(|source| ReadError::Scratch {
        path: path.to_path_buf(),
        source,
    })?;

    let decompress_err = |source| ReadError::Decompress {
        path: path.to_path_buf(),
        source,
    };

    let mut decoder = GzDecoder::new(BufReader::new(input));
    let mut writer = BufWriter::new(scratch.as_file());
    std::io::copy(&mut decoder, &mut writer).map_err(decompress_err)?;
    writer.flush().map_err(decompress_err)?;
    drop(writer);

    Ok(scratch)
}

fn rename(error: ReadError, original: &Path) -> ReadError {
    let path = original.to_path_buf();
    match error {
        ReadError::Open { source, .. } => ReadError::Open { path, source },
        ReadError::Scratch { source, .. } => ReadError::Scratch { path, source },
        ReadError::Decompress { source, .. } => ReadError::Decompress { path, source },
        ReadError::Decode { source, .. } => ReadError::Decode {
            path,
            source: source.context(format!("decompressed from {}", original.display())),
        },
        ReadError::Malformed { source, .. } => ReadError::Malformed { path, source },
        ReadError::IncompatibleGrid {
            expected, found, ..
        } => ReadError::IncompatibleGrid {
            path,
            expected,
            found,
        },
    }
}

/// Open a plain file for buffered reading, with the path in the error context.
pub(crate) fn open_plain(path: &Path) -> anyhow::Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    Ok(BufReader::new(file))
}
