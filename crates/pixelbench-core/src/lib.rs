//! Pixelbench Core - image filter pipeline and parallel batch scheduler.
//!
//! Pixelbench runs a fixed chain of convolution filters over every image in
//! a directory and measures how the batch scales across worker processes
//! versus worker threads.
//!
//! # Architecture
//!
//! ```text
//! Discover → Decode → Grayscale → Smooth → Edges → Sharpen → Brighten → Encode
//!                      └──────────── one job, run by one worker ────────────┘
//! ```
//!
//! The [`BatchScheduler`] dispatches jobs to a bounded pool of workers and
//! collects exactly one [`JobResult`] per job. The [`Benchmark`] harness
//! sweeps worker counts and derives speedup and efficiency.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pixelbench_core::{scheduler::run_directory, Config, ExecutionModel};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (config, _source) = Config::resolve(None)?;
//!     let report = run_directory(&config, ExecutionModel::ThreadParallel, 4).await?;
//!     println!("{}/{} in {:.4}s", report.succeeded(), report.submitted, report.elapsed_secs());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod benchmark;
pub mod config;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod raster;
pub mod scheduler;
pub mod types;
pub mod worker;

#[cfg(test)]
mod testutil;

// Re-exports for convenient access
pub use benchmark::{Benchmark, BenchmarkRow, BenchmarkTable};
pub use config::{Config, ConfigSource};
pub use error::{ConfigError, JobError, PixelbenchError, Result, RunError};
pub use filter::{FilterSettings, FilterStage};
pub use pipeline::Pipeline;
pub use raster::RasterBuffer;
pub use scheduler::{BatchReport, BatchScheduler, WorkerCommand};
pub use types::{ExecutionModel, FailureKind, ImageJob, JobOutcome, JobResult};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
