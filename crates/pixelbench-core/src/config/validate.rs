//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "processing.supported_formats must not be empty".into(),
            ));
        }
        if self.benchmark.worker_counts.is_empty() {
            return Err(ConfigError::ValidationError(
                "benchmark.worker_counts must not be empty".into(),
            ));
        }
        if self.benchmark.worker_counts.contains(&0) {
            return Err(ConfigError::ValidationError(
                "benchmark.worker_counts entries must be >= 1".into(),
            ));
        }
        if self.benchmark.models.is_empty() {
            return Err(ConfigError::ValidationError(
                "benchmark.models must not be empty".into(),
            ));
        }
        if self.benchmark.run_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "benchmark.run_timeout_secs must be > 0".into(),
            ));
        }
        let factor = self.filters.brightness_factor;
        if !factor.is_finite() || factor < 0.0 {
            return Err(ConfigError::ValidationError(
                "filters.brightness_factor must be a finite value >= 0".into(),
            ));
        }
        Ok(())
    }
}
