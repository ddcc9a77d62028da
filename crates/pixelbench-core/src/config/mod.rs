//! Configuration management for pixelbench.
//!
//! Configuration is loaded from the platform config directory (or an explicit
//! path) with defaults for every field. Nothing here is process-global: the
//! loaded [`Config`] is passed explicitly to the scheduler and the harness.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use crate::filter::FilterSettings;
use crate::types::ExecutionModel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a loaded [`Config`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Defaults => f.write_str("built-in defaults"),
        }
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input and output directories
    pub paths: PathsConfig,

    /// Processing settings
    pub processing: ProcessingConfig,

    /// Filter parameters
    pub filters: FilterSettings,

    /// Benchmark sweep settings
    pub benchmark: BenchmarkConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load from `explicit` if given, otherwise from the default location,
    /// reporting which one was used.
    ///
    /// A missing default file yields the built-in defaults; a missing
    /// explicit file is an error.
    pub fn resolve(explicit: Option<&Path>) -> Result<(Self, ConfigSource), ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => Self::default_path(),
        };
        if explicit.is_none() && !path.exists() {
            return Ok((Self::default(), ConfigSource::Defaults));
        }
        let config = Self::load_from(&path)?;
        Ok((config, ConfigSource::File(path)))
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.pixelbench.pixelbench/config.toml
    /// - Linux: ~/.config/pixelbench/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\pixelbench\config\config.toml
    ///
    /// Falls back to ~/.pixelbench/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "pixelbench", "pixelbench")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".pixelbench").join("config.toml")
            })
    }

    /// Resolved input directory (with ~ expansion).
    pub fn input_dir(&self) -> PathBuf {
        expand(&self.paths.input_dir)
    }

    /// Resolved output directory for an execution model (with ~ expansion).
    pub fn output_dir(&self, model: ExecutionModel) -> PathBuf {
        match model {
            ExecutionModel::ProcessParallel => expand(&self.paths.process_output_dir),
            ExecutionModel::ThreadParallel => expand(&self.paths.thread_output_dir),
        }
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

fn expand(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    let expanded = shellexpand::tilde(&path_str);
    PathBuf::from(expanded.into_owned())
}
