//! Pixelbench CLI - measure image filter throughput across worker pools.
//!
//! Pixelbench runs a fixed convolution filter chain over a directory of
//! images, either across worker processes or across worker threads, and
//! benchmarks how the batch scales with the worker count.
//!
//! # Usage
//!
//! ```bash
//! # Filter every image with 4 worker processes
//! pixelbench run --model process --workers 4
//!
//! # Same batch on the thread pool, default worker count
//! pixelbench run --model thread
//!
//! # Sweep worker counts for both models
//! pixelbench bench --workers-list 1,2,4,8
//!
//! # View configuration
//! pixelbench config show
//! ```

use clap::{Parser, Subcommand};
use pixelbench_core::config::{Config, ConfigSource};
use std::path::PathBuf;

mod cli;
mod logging;

/// Pixelbench - image filter throughput across process and thread pools.
#[derive(Parser, Debug)]
#[command(name = "pixelbench")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "PIXELBENCH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Filter every image in the input directory once
    Run(cli::run::RunArgs),

    /// Sweep worker counts for each execution model
    Bench(cli::bench::BenchArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),

    /// Serve jobs over stdin/stdout (started by the process model)
    #[command(hide = true)]
    Worker,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let (config, source) = match Config::resolve(cli.config.as_deref()) {
        Ok(resolved) => resolved,
        Err(e) if cli.config.is_some() => return Err(e.into()),
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `pixelbench config path`."
            );
            (Config::default(), ConfigSource::Defaults)
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Pixelbench v{} (config: {})", pixelbench_core::VERSION, source);

    match cli.command {
        Commands::Run(args) => cli::run::execute(args, config).await,
        Commands::Bench(args) => cli::bench::execute(args, config, cli.config).await,
        Commands::Config(args) => cli::config::execute(args, config, source, cli.config).await,
        Commands::Worker => cli::worker::execute().await,
    }
}
