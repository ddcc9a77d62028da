//! Ways of executing one timed batch run for the benchmark sweep.

use async_trait::async_trait;
use regex::Regex;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::process::Command;

use crate::config::Config;
use crate::error::RunError;
use crate::pipeline::prepare_batch;
use crate::scheduler::{BatchScheduler, WorkerCommand};
use crate::types::ExecutionModel;

/// Executes a full batch run and reports its elapsed wall-clock time.
#[async_trait]
pub trait RunExecutor: Send {
    /// Run every configured image through `model` with `workers` workers.
    async fn run(&mut self, model: ExecutionModel, workers: usize) -> Result<f64, RunError>;
}

/// Runs batches inside the current process through the scheduler.
pub struct InProcessExecutor {
    config: Config,
    worker_command: Option<WorkerCommand>,
}

impl InProcessExecutor {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            worker_command: None,
        }
    }

    /// Start process-model workers with `command` instead of the running
    /// executable.
    pub fn with_worker_command(mut self, command: WorkerCommand) -> Self {
        self.worker_command = Some(command);
        self
    }
}

#[async_trait]
impl RunExecutor for InProcessExecutor {
    async fn run(&mut self, model: ExecutionModel, workers: usize) -> Result<f64, RunError> {
        let jobs = prepare_batch(&self.config, model)?;
        let mut scheduler = BatchScheduler::from_config(&self.config, model);
        if let Some(command) = &self.worker_command {
            scheduler = scheduler.with_worker_command(command.clone());
        }
        let report = scheduler.run(jobs, workers).await?;
        Ok(report.elapsed_secs())
    }
}

/// Runs each batch as a separate invocation of the CLI's `run` command and
/// reads the elapsed time back from its standard output.
pub struct CommandExecutor {
    program: PathBuf,
    args: Vec<OsString>,
    timeout: Duration,
}

impl CommandExecutor {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout,
        }
    }

    /// The running executable.
    pub fn current_exe(timeout: Duration) -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_exe()?, timeout))
    }

    /// Arguments placed before the `run` subcommand (e.g. `--config <path>`).
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

#[async_trait]
impl RunExecutor for CommandExecutor {
    async fn run(&mut self, model: ExecutionModel, workers: usize) -> Result<f64, RunError> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg("run")
            .arg("--model")
            .arg(model.as_str())
            .arg("--workers")
            .arg(workers.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| RunError::Timeout {
                secs: self.timeout.as_secs(),
            })??;

        if !output.status.success() {
            return Err(RunError::Exit {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_elapsed(&stdout).ok_or(RunError::MissingTiming)
    }
}

/// Extract the seconds from a `Time taken: <seconds> seconds` line.
pub fn parse_elapsed(output: &str) -> Option<f64> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"Time taken:\s+([\d.]+)\s+seconds").expect("elapsed-time pattern is valid")
    });
    pattern
        .captures(output)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_elapsed_from_run_output() {
        let output = "Starting image processing with 4 workers...\n\
                      Processing complete.\n\
                      Time taken: 2.3456 seconds\n\
                      Images processed successfully: 10/10\n";
        assert_eq!(parse_elapsed(output), Some(2.3456));
    }

    #[test]
    fn test_parse_elapsed_missing_line() {
        assert_eq!(parse_elapsed("Processing complete.\n"), None);
        assert_eq!(parse_elapsed("Time taken: soon seconds"), None);
    }

    #[test]
    fn test_parse_elapsed_rejects_malformed_number() {
        assert_eq!(parse_elapsed("Time taken: 1.2.3 seconds"), None);
    }

    #[tokio::test]
    async fn test_in_process_executor_reports_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.paths.input_dir = dir.path().join("missing");
        config.paths.thread_output_dir = dir.path().join("out");

        let mut executor = InProcessExecutor::new(config);
        let err = executor
            .run(ExecutionModel::ThreadParallel, 2)
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::Config(_)));
    }

    #[tokio::test]
    async fn test_in_process_executor_times_a_batch() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        crate::testutil::write_sample_images(input.path(), 3);

        let mut config = Config::default();
        config.paths.input_dir = input.path().to_path_buf();
        config.paths.thread_output_dir = output.path().to_path_buf();

        let mut executor = InProcessExecutor::new(config);
        let elapsed = executor
            .run(ExecutionModel::ThreadParallel, 2)
            .await
            .unwrap();
        assert!(elapsed >= 0.0);
        assert!(output.path().join("sample_00.png").exists());
    }

    #[tokio::test]
    async fn test_command_executor_missing_program_fails_to_launch() {
        let dir = tempfile::tempdir().unwrap();
        let mut executor = CommandExecutor::new(dir.path().join("nope"), Duration::from_secs(5));
        let err = executor
            .run(ExecutionModel::ProcessParallel, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::Launch(_)));
    }
}
