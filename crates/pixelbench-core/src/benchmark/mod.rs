//! Benchmark harness: sweep worker counts per execution model and derive
//! speedup and efficiency against the single-worker run.
//!
//! The baseline is the elapsed time of the `W = 1` run. Rows measured
//! without a baseline (because `1` is not in the sweep, or its run failed)
//! carry no speedup or efficiency. The `W = 1` row itself is always
//! reported as speedup 1.0 and efficiency 1.0; if its elapsed time reads as
//! zero it still gets those values but is not used as a baseline. A failed
//! run yields a row with no timing and never aborts the sweep.

mod executor;

pub use executor::{parse_elapsed, CommandExecutor, InProcessExecutor, RunExecutor};

use serde::Serialize;
use std::fmt;

use crate::config::BenchmarkConfig;
use crate::types::ExecutionModel;

/// Timing for one worker count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BenchmarkRow {
    pub workers: usize,
    /// Wall-clock seconds, `None` if the run failed
    pub elapsed: Option<f64>,
    /// `baseline / elapsed`
    pub speedup: Option<f64>,
    /// `speedup / workers`
    pub efficiency: Option<f64>,
}

/// Turn raw `(workers, elapsed)` samples, in sweep order, into table rows.
pub fn derive_rows(samples: &[(usize, Option<f64>)]) -> Vec<BenchmarkRow> {
    let mut baseline: Option<f64> = None;

    samples
        .iter()
        .map(|&(workers, elapsed)| {
            let Some(time) = elapsed else {
                return BenchmarkRow {
                    workers,
                    elapsed: None,
                    speedup: None,
                    efficiency: None,
                };
            };

            if workers == 1 {
                // A zero reading is below timer resolution; later rows get no speedup.
                baseline = (time > 0.0).then_some(time);
                return BenchmarkRow {
                    workers,
                    elapsed: Some(time),
                    speedup: Some(1.0),
                    efficiency: Some(1.0),
                };
            }

            let speedup = match baseline {
                Some(base) if time > 0.0 => Some(base / time),
                _ => None,
            };
            BenchmarkRow {
                workers,
                elapsed: Some(time),
                speedup,
                efficiency: speedup.map(|s| s / workers as f64),
            }
        })
        .collect()
}

/// Sweep results for one execution model.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkTable {
    pub model: ExecutionModel,
    pub rows: Vec<BenchmarkRow>,
}

impl fmt::Display for BenchmarkTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<10} | {:<10} | {:<10} | {:<10}",
            "Workers", "Time (s)", "Speedup", "Efficiency"
        )?;
        writeln!(f, "{}", "-".repeat(50))?;
        for row in &self.rows {
            let time = match row.elapsed {
                Some(t) => format!("{t:.4}"),
                None => "Failed".to_string(),
            };
            let speedup = row.speedup.map_or_else(|| "-".to_string(), |s| format!("{s:.2}"));
            let efficiency = row
                .efficiency
                .map_or_else(|| "-".to_string(), |e| format!("{e:.2}"));
            writeln!(
                f,
                "{:<10} | {:<10} | {:<10} | {:<10}",
                row.workers, time, speedup, efficiency
            )?;
        }
        Ok(())
    }
}

/// Drives one executor through a list of worker counts.
pub struct Benchmark {
    worker_counts: Vec<usize>,
}

impl Benchmark {
    pub fn new(worker_counts: Vec<usize>) -> Self {
        Self { worker_counts }
    }

    pub fn from_config(config: &BenchmarkConfig) -> Self {
        Self::new(config.worker_counts.clone())
    }

    pub fn worker_counts(&self) -> &[usize] {
        &self.worker_counts
    }

    /// Run the sweep for `model`.
    pub async fn sweep(
        &self,
        executor: &mut dyn RunExecutor,
        model: ExecutionModel,
    ) -> BenchmarkTable {
        self.sweep_with(executor, model, |_, _| {}).await
    }

    /// Run the sweep, calling `on_run` after each worker count finishes.
    pub async fn sweep_with<F>(
        &self,
        executor: &mut dyn RunExecutor,
        model: ExecutionModel,
        mut on_run: F,
    ) -> BenchmarkTable
    where
        F: FnMut(usize, Option<f64>),
    {
        let mut samples = Vec::with_capacity(self.worker_counts.len());

        for &workers in &self.worker_counts {
            tracing::info!("Benchmarking {} with {} workers", model, workers);
            let elapsed = match executor.run(model, workers).await {
                Ok(secs) => Some(secs),
                Err(e) => {
                    tracing::warn!("{} run with {} workers failed: {}", model, workers, e);
                    None
                }
            };
            on_run(workers, elapsed);
            samples.push((workers, elapsed));
        }

        BenchmarkTable {
            model,
            rows: derive_rows(&samples),
        }
    }
}
