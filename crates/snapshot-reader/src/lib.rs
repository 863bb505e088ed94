//! Snapshot reading for precipitation series extraction.
//!
//! One snapshot file in, one [`Snapshot`] out. The raster codec itself is an
//! external collaborator behind [`SnapshotDecoder`]; this crate owns the
//! parts around it:
//!
//! - [`SnapshotFormat`]: the single `Plain | GzipWrapped` dispatch point
//! - [`SnapshotReader`]: decompresses gzip-wrapped files into a scoped
//!   scratch file, hands the path to the decoder, validates the result
//! - [`JsonSnapshotDecoder`]: decoder for the JSON interchange format used by
//!   fixtures and pre-converted grids
//!
//! # Example
//!
//! ```ignore
//! use snapshot_reader::{JsonSnapshotDecoder, RasterReader, ReaderConfig, SnapshotReader};
//!
//! let reader = SnapshotReader::new(JsonSnapshotDecoder, ReaderConfig::from_env());
//! let snapshot = reader.read("PrecipRate_20240502-120000.json.gz".as_ref())?;
//! println!("{} {:?}", snapshot.timestamp(), snapshot.field().shape());
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod json;
pub mod reader;
pub mod snapshot;

pub use config::ReaderConfig;
pub use error::{ReadError, Result};
pub use format::SnapshotFormat;
pub use json::{JsonSnapshot, JsonSnapshotDecoder};
pub use reader::{decompress_gzip_to, RasterReader, SnapshotDecoder, SnapshotReader};
pub use snapshot::Snapshot;
