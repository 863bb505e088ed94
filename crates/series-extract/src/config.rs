//! Configuration for series extraction.

use serde::{Deserialize, Serialize};
use series_common::ConfigError;

use crate::sampler::DEFAULT_UPSAMPLE_FACTOR;

/// Configuration for a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Size of the worker pool.
    pub workers: usize,

    /// Densify the clipped grid before masking and aggregation.
    pub upsample: bool,

    /// Densification factor; each axis of length N becomes `factor * N - 1`.
    pub upsample_factor: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            upsample: false,
            upsample_factor: DEFAULT_UPSAMPLE_FACTOR,
        }
    }
}

impl ExtractionConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("SERIES_WORKERS") {
            if let Ok(workers) = val.parse() {
                config.workers = workers;
            }
        }

        if let Ok(val) = std::env::var("SERIES_UPSAMPLE") {
            config.upsample = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("SERIES_UPSAMPLE_FACTOR") {
            if let Ok(factor) = val.parse() {
                config.upsample_factor = factor;
            }
        }

        config
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_upsample(mut self, upsample: bool) -> Self {
        self.upsample = upsample;
        self
    }

    pub fn with_upsample_factor(mut self, factor: usize) -> Self {
        self.upsample_factor = factor;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::invalid_setting("workers", "must be > 0"));
        }

        if self.upsample_factor < 2 {
            return Err(ConfigError::invalid_setting(
                "upsample_factor",
                format!("must be >= 2, got {}", self.upsample_factor),
            ));
        }

        Ok(())
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
