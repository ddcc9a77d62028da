//! Parallel batch scheduling over a bounded worker pool.
//!
//! One [`BatchScheduler`] serves both execution models; the model only
//! changes how jobs are dispatched:
//! - **threads**: blocking-pool tasks sharing this process's memory
//! - **processes**: long-lived worker processes fed over stdin/stdout
//!
//! Results come back in completion order. The scheduler guarantees one
//! result per submitted job, never that the order matches submission.

mod processes;
mod threads;

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::error::{ConfigError, JobError};
use crate::filter::FilterSettings;
use crate::pipeline::{prepare_batch, Pipeline};
use crate::types::{ExecutionModel, ImageJob, JobResult};

/// Hidden subcommand that turns the CLI binary into a worker process.
pub const WORKER_SUBCOMMAND: &str = "worker";

/// Program and arguments used to start a worker process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl WorkerCommand {
    pub fn new<I, S>(program: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// The running executable invoked with the worker subcommand.
    pub fn current_exe() -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_exe()?, [WORKER_SUBCOMMAND]))
    }
}

/// Outcome of one batch run.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Execution model used
    pub model: ExecutionModel,

    /// Worker count used
    pub workers: usize,

    /// Number of jobs submitted
    pub submitted: usize,

    /// One result per job, in completion order
    pub results: Vec<JobResult>,

    /// Wall-clock time from first dispatch to last collection
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    /// Every submitted job has reported.
    pub fn is_complete(&self) -> bool {
        self.results.len() == self.submitted
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Results that did not succeed.
    pub fn failures(&self) -> impl Iterator<Item = &JobResult> {
        self.results.iter().filter(|r| !r.is_success())
    }
}

/// Runs a set of image jobs across a pool of workers.
pub struct BatchScheduler {
    model: ExecutionModel,
    settings: FilterSettings,
    worker_command: Option<WorkerCommand>,
}

impl BatchScheduler {
    /// Scheduler for `model` with the given filter parameters.
    pub fn new(model: ExecutionModel, settings: FilterSettings) -> Self {
        Self {
            model,
            settings,
            worker_command: None,
        }
    }

    /// Scheduler using the filter settings from `config`.
    pub fn from_config(config: &Config, model: ExecutionModel) -> Self {
        Self::new(model, config.filters)
    }

    /// Override how worker processes are started (defaults to
    /// [`WorkerCommand::current_exe`]). Ignored by the thread model.
    pub fn with_worker_command(mut self, command: WorkerCommand) -> Self {
        self.worker_command = Some(command);
        self
    }

    pub fn model(&self) -> ExecutionModel {
        self.model
    }

    /// Execute every job exactly once with at most `workers` running at a time.
    ///
    /// The elapsed time covers worker startup, dispatch and collection.
    pub async fn run(
        &self,
        jobs: Vec<ImageJob>,
        workers: usize,
    ) -> Result<BatchReport, ConfigError> {
        if workers == 0 {
            return Err(ConfigError::ValidationError(
                "worker count must be >= 1".into(),
            ));
        }

        let submitted = jobs.len();
        tracing::info!(
            "Starting {} batch with {} workers on {} images",
            self.model,
            workers,
            submitted
        );

        let start = Instant::now();
        let results = match self.model {
            ExecutionModel::ThreadParallel => {
                let pipeline = Arc::new(Pipeline::new(&self.settings));
                threads::run(jobs.clone(), workers, pipeline).await
            }
            ExecutionModel::ProcessParallel => {
                let command = match &self.worker_command {
                    Some(command) => Ok(command.clone()),
                    None => WorkerCommand::current_exe(),
                };
                match command {
                    Ok(command) => {
                        processes::run(jobs.clone(), workers, self.settings, command).await
                    }
                    Err(e) => {
                        let fault = JobError::WorkerFault(format!("cannot locate worker: {e}"));
                        jobs.iter()
                            .map(|job| JobResult::failure(job.clone(), &fault))
                            .collect()
                    }
                }
            }
        };
        let results = reconcile(&jobs, results);
        let elapsed = start.elapsed();

        let report = BatchReport {
            model: self.model,
            workers,
            submitted,
            results,
            elapsed,
        };
        tracing::info!(
            "Batch finished: {}/{} succeeded in {:.4}s",
            report.succeeded(),
            report.submitted,
            report.elapsed_secs()
        );
        Ok(report)
    }
}

/// Prepare the configured input/output directories for `model` and run the batch.
pub async fn run_directory(
    config: &Config,
    model: ExecutionModel,
    workers: usize,
) -> Result<BatchReport, ConfigError> {
    let jobs = prepare_batch(config, model)?;
    BatchScheduler::from_config(config, model)
        .run(jobs, workers)
        .await
}

/// Fill in a `WorkerFault` for any submitted job that produced no result.
fn reconcile(submitted: &[ImageJob], mut results: Vec<JobResult>) -> Vec<JobResult> {
    if results.len() >= submitted.len() {
        return results;
    }

    let reported: HashSet<&PathBuf> = results.iter().map(|r| &r.job.destination).collect();
    let missing: Vec<ImageJob> = submitted
        .iter()
        .filter(|job| !reported.contains(&job.destination))
        .cloned()
        .collect();

    for job in missing {
        tracing::error!("No result collected for {:?}", job.source);
        let fault = JobError::WorkerFault("worker lost the job without reporting".into());
        results.push(JobResult::failure(job, &fault));
    }
    results
}
