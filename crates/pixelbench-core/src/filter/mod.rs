//! Pixel-level filter stages.
//!
//! - **kernel**: odd-sized integer kernels and border-replicating convolution
//! - **stages**: grayscale, smooth, edge magnitude, sharpen, brightness scale
//!
//! Invariant: no stage touches any memory outside its own input and output
//! buffers. Thread-parallel batches rely on this to run without locks; a
//! stage that introduces shared mutable state must bring its own
//! synchronization.

pub mod kernel;
pub mod stages;

pub use kernel::{FilterKernel, KernelError};
pub use stages::{
    brightness_scale, edge_magnitude, grayscale, sharpen, smooth, DEFAULT_BRIGHTNESS_FACTOR,
};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::StageResult;
use crate::raster::RasterBuffer;

/// Tunable filter parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Multiplier applied by the brightness stage
    pub brightness_factor: f64,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            brightness_factor: DEFAULT_BRIGHTNESS_FACTOR,
        }
    }
}

/// One step of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterStage {
    Grayscale,
    Smooth,
    EdgeMagnitude,
    Sharpen,
    BrightnessScale { factor: f64 },
}

impl FilterStage {
    /// Apply this stage, consuming the input raster.
    pub fn apply(&self, src: RasterBuffer) -> StageResult<RasterBuffer> {
        match *self {
            FilterStage::Grayscale => grayscale(src),
            FilterStage::Smooth => smooth(src),
            FilterStage::EdgeMagnitude => edge_magnitude(src),
            FilterStage::Sharpen => sharpen(src),
            FilterStage::BrightnessScale { factor } => brightness_scale(src, factor),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FilterStage::Grayscale => "grayscale",
            FilterStage::Smooth => "smooth",
            FilterStage::EdgeMagnitude => "edge_magnitude",
            FilterStage::Sharpen => "sharpen",
            FilterStage::BrightnessScale { .. } => "brightness_scale",
        }
    }
}

impl fmt::Display for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
