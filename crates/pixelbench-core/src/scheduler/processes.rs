//! Process-parallel dispatch: a pool of worker processes pulling from a
//! shared queue.
//!
//! Each worker speaks newline-delimited JSON: one [`WorkerRequest`] per line
//! on stdin, one [`JobResult`] per line on stdout. A worker that dies or
//! answers garbage fails only its in-flight job; the slot respawns a fresh
//! process for whatever is left in the queue.

use std::collections::VecDeque;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::mpsc;

use super::WorkerCommand;
use crate::error::JobError;
use crate::filter::FilterSettings;
use crate::types::{ImageJob, JobResult};
use crate::worker::WorkerRequest;

type JobQueue = Arc<Mutex<VecDeque<ImageJob>>>;

pub(super) async fn run(
    jobs: Vec<ImageJob>,
    workers: usize,
    settings: FilterSettings,
    command: WorkerCommand,
) -> Vec<JobResult> {
    let total = jobs.len();
    let slots = workers.min(total);
    let queue: JobQueue = Arc::new(Mutex::new(jobs.into()));
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut handles = Vec::with_capacity(slots);
    for slot in 0..slots {
        handles.push(tokio::spawn(worker_slot(
            slot,
            Arc::clone(&queue),
            tx.clone(),
            settings,
            command.clone(),
        )));
    }
    drop(tx);

    let mut results = Vec::with_capacity(total);
    while let Some(result) = rx.recv().await {
        results.push(result);
    }

    for handle in handles {
        if let Err(e) = handle.await {
            tracing::error!("Worker slot task failed: {}", e);
        }
    }
    results
}

fn next_job(queue: &JobQueue) -> Option<ImageJob> {
    match queue.lock() {
        Ok(mut jobs) => jobs.pop_front(),
        Err(poisoned) => poisoned.into_inner().pop_front(),
    }
}

/// Drive one pool slot until the queue is empty.
async fn worker_slot(
    slot: usize,
    queue: JobQueue,
    results: mpsc::UnboundedSender<JobResult>,
    settings: FilterSettings,
    command: WorkerCommand,
) {
    let mut worker: Option<WorkerProcess> = None;

    while let Some(job) = next_job(&queue) {
        if worker.is_none() {
            match WorkerProcess::spawn(&command) {
                Ok(process) => {
                    tracing::debug!("Slot {} started worker pid {:?}", slot, process.pid());
                    worker = Some(process);
                }
                Err(e) => {
                    let fault = JobError::WorkerFault(format!(
                        "cannot start worker {:?}: {}",
                        command.program, e
                    ));
                    tracing::error!("{}", fault);
                    let _ = results.send(JobResult::failure(job, &fault));
                    continue;
                }
            }
        }

        let outcome = match worker.as_mut() {
            Some(process) => process.submit(&job, settings).await,
            None => Err("no worker process".to_string()),
        };

        let result = match outcome {
            Ok(result) => result,
            Err(reason) => {
                tracing::warn!("Worker fault on {:?}: {}", job.source, reason);
                if let Some(process) = worker.take() {
                    process.kill().await;
                }
                JobResult::failure(job, &JobError::WorkerFault(reason))
            }
        };

        if results.send(result).is_err() {
            break;
        }
    }

    if let Some(process) = worker {
        process.shutdown().await;
    }
}

/// A running worker process and its protocol pipes.
struct WorkerProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

impl WorkerProcess {
    fn spawn(command: &WorkerCommand) -> std::io::Result<Self> {
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| std::io::Error::other("worker stdin not captured"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("worker stdout not captured"))?;

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
        })
    }

    fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// Send one job and wait for its result line.
    async fn submit(
        &mut self,
        job: &ImageJob,
        settings: FilterSettings,
    ) -> Result<JobResult, String> {
        let request = WorkerRequest {
            job: job.clone(),
            settings,
        };
        let mut line = serde_json::to_vec(&request).map_err(|e| e.to_string())?;
        line.push(b'\n');

        self.stdin
            .write_all(&line)
            .await
            .map_err(|e| format!("cannot send job to worker: {e}"))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| format!("cannot send job to worker: {e}"))?;

        let reply = self
            .stdout
            .next_line()
            .await
            .map_err(|e| format!("cannot read worker reply: {e}"))?
            .ok_or_else(|| "worker exited before replying".to_string())?;

        let result: JobResult =
            serde_json::from_str(&reply).map_err(|e| format!("malformed worker reply: {e}"))?;
        if &result.job != job {
            return Err(format!("worker replied for {:?}", result.job.source));
        }
        Ok(result)
    }

    /// Close stdin so the worker drains and exits, then reap it.
    async fn shutdown(self) {
        let WorkerProcess {
            mut child, stdin, ..
        } = self;
        drop(stdin);
        match child.wait().await {
            Ok(status) if !status.success() => {
                tracing::warn!("Worker exited with {}", status);
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Failed to reap worker: {}", e),
        }
    }

    async fn kill(mut self) {
        if let Err(e) = self.child.kill().await {
            tracing::debug!("Worker already gone: {}", e);
        }
    }
}
