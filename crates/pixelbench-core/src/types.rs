//! Core data types shared by the pipeline runner, the scheduler and worker
//! processes.
//!
//! Jobs and results are serde-serializable because the process-parallel
//! model ships them across the worker boundary as JSON lines.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::JobError;

/// One unit of work: a source image and the file its filtered copy goes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageJob {
    /// Image file to decode
    pub source: PathBuf,

    /// Pre-assigned output file (unique per job)
    pub destination: PathBuf,
}

impl ImageJob {
    /// Create a job for `source` writing to `destination`.
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

/// Category of a per-job failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Unreadable or corrupt source file
    Decode,
    /// Stage precondition violated
    InvalidImage,
    /// Destination unwritable
    Encode,
    /// Worker terminated abnormally
    WorkerFault,
}

/// What happened to a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobOutcome {
    /// Filtered image written to `destination`
    Success { destination: PathBuf },

    /// Job failed; sibling jobs are unaffected
    Failure { kind: FailureKind, message: String },
}

/// Exactly one of these is produced per submitted [`ImageJob`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    /// The job this result belongs to
    pub job: ImageJob,

    /// Success or failure
    pub outcome: JobOutcome,
}

impl JobResult {
    /// Successful result; the destination is taken from the job.
    pub fn success(job: ImageJob) -> Self {
        let destination = job.destination.clone();
        Self {
            job,
            outcome: JobOutcome::Success { destination },
        }
    }

    /// Failed result carrying the error's category and message.
    pub fn failure(job: ImageJob, error: &JobError) -> Self {
        Self {
            job,
            outcome: JobOutcome::Failure {
                kind: error.kind(),
                message: error.to_string(),
            },
        }
    }

    /// Whether the job succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, JobOutcome::Success { .. })
    }
}

/// How the scheduler runs jobs concurrently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionModel {
    /// Each worker is a separate OS process with its own memory
    #[serde(rename = "process")]
    ProcessParallel,

    /// Jobs are tasks on a thread pool sharing one address space
    #[serde(rename = "thread")]
    ThreadParallel,
}

impl ExecutionModel {
    /// Both models, in benchmark order.
    pub const ALL: [ExecutionModel; 2] =
        [ExecutionModel::ProcessParallel, ExecutionModel::ThreadParallel];

    /// Worker count used when none (or 0) is requested.
    ///
    /// Physical cores for processes; for threads, the usual pool default of
    /// logical cores + 4, capped at 32.
    pub fn default_workers(self) -> usize {
        match self {
            ExecutionModel::ProcessParallel => num_cpus::get_physical().max(1),
            ExecutionModel::ThreadParallel => (num_cpus::get() + 4).min(32),
        }
    }

    /// Resolve a requested worker count, mapping 0 to the model default.
    pub fn resolve_workers(self, requested: usize) -> usize {
        if requested == 0 {
            self.default_workers()
        } else {
            requested
        }
    }

    /// Short name used in config files and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            ExecutionModel::ProcessParallel => "process",
            ExecutionModel::ThreadParallel => "thread",
        }
    }

    /// Human-readable label for reports.
    pub fn label(self) -> &'static str {
        match self {
            ExecutionModel::ProcessParallel => "Multiprocessing",
            ExecutionModel::ThreadParallel => "Threading",
        }
    }
}

impl fmt::Display for ExecutionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "process" | "processes" | "multiprocessing" => Ok(ExecutionModel::ProcessParallel),
            "thread" | "threads" | "threading" => Ok(ExecutionModel::ThreadParallel),
            other => Err(format!("unknown execution model: {other}")),
        }
    }
}
