//! Pipeline orchestration: decode, the fixed filter sequence, encode.

use std::time::Instant;

use crate::error::{JobError, StageResult};
use crate::filter::{FilterSettings, FilterStage};
use crate::raster::{io, RasterBuffer};
use crate::types::{ImageJob, JobResult};

/// Runs the five filter stages in their fixed order.
///
/// Grayscale must precede edge extraction, so the order is not
/// configurable; only stage parameters are.
#[derive(Debug, Clone)]
pub struct Pipeline {
    stages: [FilterStage; 5],
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(&FilterSettings::default())
    }
}

impl Pipeline {
    /// Build the pipeline for the given settings.
    pub fn new(settings: &FilterSettings) -> Self {
        Self {
            stages: [
                FilterStage::Grayscale,
                FilterStage::Smooth,
                FilterStage::EdgeMagnitude,
                FilterStage::Sharpen,
                FilterStage::BrightnessScale {
                    factor: settings.brightness_factor,
                },
            ],
        }
    }

    /// The stages in execution order.
    pub fn stages(&self) -> &[FilterStage] {
        &self.stages
    }

    /// Run every stage over a decoded raster.
    pub fn run(&self, raster: RasterBuffer) -> StageResult<RasterBuffer> {
        self.stages.iter().try_fold(raster, |raster, stage| {
            let start = Instant::now();
            let out = stage.apply(raster)?;
            tracing::trace!("  {}: {:?}", stage, start.elapsed());
            Ok(out)
        })
    }

    /// Decode, filter and encode one job.
    ///
    /// Every error is folded into the returned [`JobResult`]; nothing
    /// escapes to the caller.
    pub fn process(&self, job: &ImageJob) -> JobResult {
        let start = Instant::now();
        tracing::debug!("Processing: {:?}", job.source);

        match self.process_inner(job) {
            Ok(()) => {
                tracing::debug!("Processed {:?} in {:?}", job.source, start.elapsed());
                JobResult::success(job.clone())
            }
            Err(e) => {
                tracing::warn!("Failed: {:?} - {}", job.source, e);
                JobResult::failure(job.clone(), &e)
            }
        }
    }

    fn process_inner(&self, job: &ImageJob) -> Result<(), JobError> {
        let decode_start = Instant::now();
        let raster = io::decode(&job.source)?;
        tracing::trace!(
            "  Decode: {:?} ({}x{}x{})",
            decode_start.elapsed(),
            raster.width(),
            raster.height(),
            raster.channels()
        );

        let filtered = self.run(raster)?;

        let encode_start = Instant::now();
        io::encode(filtered, &job.destination)?;
        tracing::trace!("  Encode: {:?}", encode_start.elapsed());
        Ok(())
    }
}
