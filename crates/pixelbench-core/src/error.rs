//! Error types for the pixelbench filter pipeline and batch scheduler.
//!
//! Per-job errors ([`JobError`]) never cross the scheduler boundary: the
//! pipeline runner converts them into a failed [`JobResult`](crate::types::JobResult).
//! Only configuration problems ([`ConfigError`]) abort a run.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::FailureKind;

/// Top-level error type for pixelbench operations.
#[derive(Error, Debug)]
pub enum PixelbenchError {
    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors. Fatal for a run, reported before any
/// scheduling begins.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// The input directory does not exist
    #[error("Input directory {0:?} not found")]
    InputDirNotFound(PathBuf),

    /// The input directory holds no supported image files
    #[error("No images found to process in {0:?}")]
    NoImages(PathBuf),

    /// The output directory could not be created or cleared
    #[error("Cannot prepare output directory {path:?}: {message}")]
    OutputDir { path: PathBuf, message: String },
}

/// Per-image failures. Each one is recovered as that job's failure outcome.
#[derive(Error, Debug)]
pub enum JobError {
    /// Source file unreadable or not a decodable image
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// A stage precondition was violated
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// Destination could not be written
    #[error("Encode error for {path}: {message}")]
    Encode { path: PathBuf, message: String },

    /// The worker running the job terminated abnormally
    #[error("Worker fault: {0}")]
    WorkerFault(String),
}

impl JobError {
    /// Failure category reported in the job's outcome.
    pub fn kind(&self) -> FailureKind {
        match self {
            JobError::Decode { .. } => FailureKind::Decode,
            JobError::InvalidImage(_) => FailureKind::InvalidImage,
            JobError::Encode { .. } => FailureKind::Encode,
            JobError::WorkerFault(_) => FailureKind::WorkerFault,
        }
    }
}

/// Why a single benchmark run produced no timing. The harness records
/// these as failed rows and moves on to the next worker count.
#[derive(Error, Debug)]
pub enum RunError {
    /// The run could not be started
    #[error("Failed to launch run: {0}")]
    Launch(#[from] std::io::Error),

    /// The run exceeded its time limit and was killed
    #[error("Run timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The run exited unsuccessfully
    #[error("Run exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },

    /// The run finished but reported no elapsed time
    #[error("No timing found in run output")]
    MissingTiming,

    /// The run was rejected before scheduling
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Convenience type alias for pixelbench results.
pub type Result<T> = std::result::Result<T, PixelbenchError>;

/// Convenience type alias for pipeline-stage results.
pub type StageResult<T> = std::result::Result<T, JobError>;
