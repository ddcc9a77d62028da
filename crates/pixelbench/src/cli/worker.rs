//! The hidden `pixelbench worker` command, spawned by the process model.

/// Serve jobs from stdin until the scheduler closes it.
pub async fn execute() -> anyhow::Result<()> {
    let handled = tokio::task::spawn_blocking(|| {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        pixelbench_core::worker::serve(stdin.lock(), stdout.lock())
    })
    .await??;

    tracing::debug!("Worker {} exiting after {} jobs", std::process::id(), handled);
    Ok(())
}
