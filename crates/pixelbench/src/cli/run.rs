//! The `pixelbench run` command: one directory batch, one summary.
//!
//! The `Time taken:` line is parsed by `pixelbench bench`, so its wording
//! must not change.

use clap::Args;
use pixelbench_core::scheduler::run_directory;
use pixelbench_core::{Config, ExecutionModel};
use std::path::PathBuf;

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Execution model: process or thread
    #[arg(short, long, default_value = "process")]
    pub model: ExecutionModel,

    /// Number of workers (0 or absent = model default)
    #[arg(short, long, default_value_t = 0)]
    pub workers: usize,

    /// Input directory (overrides paths.input_dir)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output directory (overrides the model's configured output directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute the run command.
pub async fn execute(args: RunArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(input) = args.input {
        config.paths.input_dir = input;
    }
    if let Some(output) = args.output {
        match args.model {
            ExecutionModel::ProcessParallel => config.paths.process_output_dir = output,
            ExecutionModel::ThreadParallel => config.paths.thread_output_dir = output,
        }
    }

    let workers = args.model.resolve_workers(args.workers);
    println!(
        "Starting {} processing with {} workers on images in {}...",
        args.model.label(),
        workers,
        config.input_dir().display()
    );

    let report = run_directory(&config, args.model, workers).await?;

    println!("Processing complete.");
    println!("Time taken: {:.4} seconds", report.elapsed_secs());
    println!(
        "Images processed successfully: {}/{}",
        report.succeeded(),
        report.submitted
    );

    if report.failed() > 0 {
        tracing::warn!(
            "{} of {} images failed; see the warnings above for reasons",
            report.failed(),
            report.submitted
        );
    }
    Ok(())
}
