//! Worker-process side of the process-parallel model.
//!
//! A worker reads one JSON [`WorkerRequest`] per line, runs the pipeline,
//! and answers with one JSON [`JobResult`] line. It exits cleanly on EOF.

use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};

use crate::error::Result;
use crate::filter::FilterSettings;
use crate::pipeline::Pipeline;
use crate::types::ImageJob;

/// One job as sent to a worker process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerRequest {
    pub job: ImageJob,
    pub settings: FilterSettings,
}

/// Serve requests from `input` until EOF. Returns the number of jobs handled.
///
/// Job failures are answered as failed results; only a broken pipe or an
/// unparseable request ends the loop with an error.
pub fn serve<R: BufRead, W: Write>(input: R, mut output: W) -> Result<usize> {
    let mut handled = 0;
    let mut settings = FilterSettings::default();
    let mut pipeline = Pipeline::new(&settings);

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let request: WorkerRequest = serde_json::from_str(&line)?;

        if request.settings != settings {
            settings = request.settings;
            pipeline = Pipeline::new(&settings);
        }

        let result = pipeline.process(&request.job);
        serde_json::to_writer(&mut output, &result)?;
        output.write_all(b"\n")?;
        output.flush()?;
        handled += 1;
    }

    tracing::debug!("Worker handled {} jobs", handled);
    Ok(handled)
}
