//! Per-image pipeline and directory batch preparation.
//!
//! - **runner**: decode → five filter stages → encode, with per-job failure isolation
//! - **discovery**: find input images, plan jobs, clear the output directory

pub mod discovery;
pub mod runner;

// Re-exports for convenient access
pub use discovery::{clear_output_dir, prepare_batch, FileDiscovery, PLACEHOLDER_FILE};
pub use runner::Pipeline;
