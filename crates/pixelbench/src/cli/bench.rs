//! The `pixelbench bench` command: worker-count sweeps per execution model.

use anyhow::Context;
use clap::Args;
use pixelbench_core::benchmark::{CommandExecutor, InProcessExecutor, RunExecutor};
use pixelbench_core::pipeline::FileDiscovery;
use pixelbench_core::{Benchmark, Config, ExecutionModel};
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

/// Arguments for the `bench` command.
#[derive(Args, Debug)]
pub struct BenchArgs {
    /// Execution models to sweep (defaults to benchmark.models)
    #[arg(short, long, value_delimiter = ',')]
    pub models: Vec<ExecutionModel>,

    /// Worker counts to sweep, e.g. 1,2,4 (defaults to benchmark.worker_counts)
    #[arg(short, long, value_delimiter = ',')]
    pub workers_list: Vec<usize>,

    /// Time each run inside this process instead of spawning `pixelbench run`
    #[arg(long)]
    pub in_process: bool,
}

/// Execute the bench command. `config_path` is forwarded to child runs.
pub async fn execute(
    args: BenchArgs,
    mut config: Config,
    config_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    if !args.models.is_empty() {
        config.benchmark.models = args.models;
    }
    if !args.workers_list.is_empty() {
        config.benchmark.worker_counts = args.workers_list;
    }
    config.validate()?;

    let input_dir = config.input_dir();
    let dataset_size = FileDiscovery::new(config.processing.clone())
        .discover(&input_dir)
        .len();
    if dataset_size == 0 {
        anyhow::bail!("No images found in {}", input_dir.display());
    }

    println!("Benchmarking on {} CPU cores.", num_cpus::get());
    println!("Dataset Size: {} images", dataset_size);
    println!(
        "Testing worker counts: {:?}\n",
        config.benchmark.worker_counts
    );

    let mut executor: Box<dyn RunExecutor> = if args.in_process {
        Box::new(InProcessExecutor::new(config.clone()))
    } else {
        let timeout = Duration::from_secs(config.benchmark.run_timeout_secs);
        let mut executor = CommandExecutor::current_exe(timeout)
            .context("Cannot locate the pixelbench executable")?;
        if let Some(path) = config_path {
            executor = executor.with_args([OsString::from("--config"), path.into_os_string()]);
        }
        Box::new(executor)
    };

    let benchmark = Benchmark::from_config(&config.benchmark);
    for &model in &config.benchmark.models {
        println!("--- Benchmarking {} ({}) ---", model.label(), model);

        let progress = create_progress_bar(benchmark.worker_counts().len() as u64);
        let table = benchmark
            .sweep_with(executor.as_mut(), model, |workers, elapsed| {
                progress.inc(1);
                match elapsed {
                    Some(secs) => progress.set_message(format!("W={workers}: {secs:.2}s")),
                    None => progress.set_message(format!("W={workers}: failed")),
                }
            })
            .await;
        progress.finish_and_clear();

        println!("{table}");
    }

    Ok(())
}

/// Create a progress bar for one sweep.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .map(|style| style.progress_chars("##-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}
