//! Configuration for snapshot reading.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use series_common::ConfigError;

/// Configuration for the snapshot reader.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Directory for decompressed scratch copies of gzip-wrapped snapshots.
    /// `None` uses the system temp directory.
    pub scratch_dir: Option<PathBuf>,
}

impl ReaderConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("SNAPSHOT_SCRATCH_DIR") {
            if !val.trim().is_empty() {
                config.scratch_dir = Some(PathBuf::from(val));
            }
        }

        config
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(dir) = &self.scratch_dir {
            if !dir.is_dir() {
                return Err(ConfigError::invalid_setting(
                    "scratch_dir",
                    format!("{} is not an existing directory", dir.display()),
                ));
            }
        }
        Ok(())
    }
}
