//! Thread-parallel dispatch: blocking-pool tasks gated by a semaphore.
//!
//! Filter stages share no mutable state, so the pipeline is shared by
//! reference across tasks without any locking.

use futures_util::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinError;

use crate::error::JobError;
use crate::pipeline::Pipeline;
use crate::types::{ImageJob, JobResult};

pub(super) async fn run(
    jobs: Vec<ImageJob>,
    workers: usize,
    pipeline: Arc<Pipeline>,
) -> Vec<JobResult> {
    let semaphore = Arc::new(Semaphore::new(workers));
    let mut results = Vec::with_capacity(jobs.len());

    let mut in_flight: FuturesUnordered<_> = jobs
        .into_iter()
        .map(|job| {
            let semaphore = Arc::clone(&semaphore);
            let pipeline = Arc::clone(&pipeline);
            async move {
                let permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        return JobResult::failure(job, &JobError::WorkerFault(e.to_string()))
                    }
                };
                let task_job = job.clone();
                let handle = tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    pipeline.process(&task_job)
                });
                match handle.await {
                    Ok(result) => result,
                    Err(e) => {
                        let fault = JobError::WorkerFault(join_error_message(e));
                        tracing::error!("Worker fault on {:?}: {}", job.source, fault);
                        JobResult::failure(job, &fault)
                    }
                }
            }
        })
        .collect();

    // Collect as tasks complete
    while let Some(result) = in_flight.next().await {
        results.push(result);
    }
    results
}

fn join_error_message(error: JoinError) -> String {
    if error.is_panic() {
        let payload = error.into_panic();
        if let Some(msg) = payload.downcast_ref::<&str>() {
            format!("task panicked: {msg}")
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            format!("task panicked: {msg}")
        } else {
            "task panicked".to_string()
        }
    } else {
        format!("task cancelled: {error}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_panicking_task_is_reported_as_fault() {
        let handle = tokio::task::spawn_blocking(|| -> u8 { panic!("boom") });
        let err = handle.await.unwrap_err();
        assert_eq!(join_error_message(err), "task panicked: boom");
    }

    #[tokio::test]
    async fn test_empty_batch_yields_no_results() {
        let results = run(vec![], 4, Arc::new(Pipeline::default())).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_every_job_reports_once() {
        let dir = tempfile::tempdir().unwrap();
        let jobs: Vec<_> = (0..10)
            .map(|i| {
                ImageJob::new(
                    dir.path().join(format!("missing_{i}.png")),
                    dir.path().join(format!("out_{i}.png")),
                )
            })
            .collect();
        let results = run(jobs.clone(), 3, Arc::new(Pipeline::default())).await;
        assert_eq!(results.len(), 10);
        for job in &jobs {
            assert_eq!(results.iter().filter(|r| &r.job == job).count(), 1);
        }
    }
}
