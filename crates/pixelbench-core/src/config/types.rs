//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::types::ExecutionModel;

/// Input and output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding the source images
    pub input_dir: PathBuf,

    /// Output directory for process-parallel runs
    pub process_output_dir: PathBuf,

    /// Output directory for thread-parallel runs
    pub thread_output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input_images"),
            process_output_dir: PathBuf::from("output_multiprocessing"),
            thread_output_dir: PathBuf::from("output_concurrent"),
        }
    }
}

/// Processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Supported input extensions, matched case-insensitively
    pub supported_formats: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            supported_formats: vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()],
        }
    }
}

/// Benchmark sweep settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Worker counts to run, in order
    pub worker_counts: Vec<usize>,

    /// Execution models to benchmark
    pub models: Vec<ExecutionModel>,

    /// Per-run timeout in seconds; a run exceeding it counts as failed
    pub run_timeout_secs: u64,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            worker_counts: vec![1, 2, 4, 8, 12],
            models: ExecutionModel::ALL.to_vec(),
            run_timeout_secs: 600,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level ("error", "warn", "info", "debug", "trace")
    pub level: String,

    /// Log format ("pretty" or "json")
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
