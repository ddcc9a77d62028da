//! Small integer convolution kernels with edge-replicating borders.
//!
//! Kernels are applied as correlation (not flipped), matching how the
//! Sobel and sharpening matrices are usually written down. Border pixels
//! are produced by clamping sample coordinates into the raster, so a
//! kernel never reads outside the buffer, even for a 1×1 image.

use thiserror::Error;

use crate::raster::RasterBuffer;

/// Errors building a custom kernel.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum KernelError {
    #[error("kernel dimensions must be odd, got {width}x{height}")]
    EvenDimensions { width: usize, height: usize },

    #[error("kernel {width}x{height} needs {expected} weights, got {actual}")]
    WeightCount {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    #[error("kernel divisor must be non-zero")]
    ZeroDivisor,
}

/// Immutable odd-sized weight matrix plus a normalization divisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterKernel {
    width: usize,
    height: usize,
    weights: Vec<i32>,
    divisor: i32,
}

impl FilterKernel {
    /// Build a kernel from row-major weights.
    pub fn new(
        width: usize,
        height: usize,
        weights: Vec<i32>,
        divisor: i32,
    ) -> Result<Self, KernelError> {
        if width % 2 == 0 || height % 2 == 0 {
            return Err(KernelError::EvenDimensions { width, height });
        }
        if weights.len() != width * height {
            return Err(KernelError::WeightCount {
                width,
                height,
                expected: width * height,
                actual: weights.len(),
            });
        }
        if divisor == 0 {
            return Err(KernelError::ZeroDivisor);
        }
        Ok(Self {
            width,
            height,
            weights,
            divisor,
        })
    }

    fn square3(rows: [[i32; 3]; 3], divisor: i32) -> Self {
        Self {
            width: 3,
            height: 3,
            weights: rows.concat(),
            divisor,
        }
    }

    /// Binomial approximation of a Gaussian: `[[1,2,1],[2,4,2],[1,2,1]] / 16`.
    pub fn smooth() -> Self {
        Self::square3([[1, 2, 1], [2, 4, 2], [1, 2, 1]], 16)
    }

    /// Horizontal Sobel gradient.
    pub fn sobel_x() -> Self {
        Self::square3([[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]], 1)
    }

    /// Vertical Sobel gradient.
    pub fn sobel_y() -> Self {
        Self::square3([[-1, -2, -1], [0, 0, 0], [1, 2, 1]], 1)
    }

    /// Unity-gain sharpening kernel (coefficients sum to 1).
    pub fn sharpen() -> Self {
        Self::square3([[0, -1, 0], [-1, 5, -1], [0, -1, 0]], 1)
    }

    /// Raw weighted sums for every sample, interleaved like the input.
    ///
    /// Each channel is convolved independently. No division is applied.
    pub fn correlate(&self, src: &RasterBuffer) -> Vec<i32> {
        let w = src.width() as usize;
        let h = src.height() as usize;
        let ch = src.channels() as usize;
        let data = src.as_raw();
        let rx = (self.width / 2) as isize;
        let ry = (self.height / 2) as isize;

        let mut out = vec![0i32; data.len()];

        // Clamped column index for every (x, kx) pair, reused across rows.
        let col_index: Vec<usize> = (0..w)
            .flat_map(|x| {
                (0..self.width).map(move |kx| clamp_index(x as isize + kx as isize - rx, w))
            })
            .collect();

        for y in 0..h {
            let rows: Vec<&[u8]> = (0..self.height)
                .map(|ky| {
                    let sy = clamp_index(y as isize + ky as isize - ry, h);
                    &data[sy * w * ch..(sy + 1) * w * ch]
                })
                .collect();
            let out_row = &mut out[y * w * ch..(y + 1) * w * ch];

            for x in 0..w {
                let cols = &col_index[x * self.width..(x + 1) * self.width];
                for c in 0..ch {
                    let mut acc = 0i32;
                    for (ky, row) in rows.iter().enumerate() {
                        let weights = &self.weights[ky * self.width..(ky + 1) * self.width];
                        for (&sx, &wt) in cols.iter().zip(weights) {
                            acc += wt * row[sx * ch + c] as i32;
                        }
                    }
                    out_row[x * ch + c] = acc;
                }
            }
        }

        out
    }

    /// Convolve, divide by the divisor, round and clamp to 8 bits.
    pub fn apply(&self, src: &RasterBuffer) -> Vec<u8> {
        let divisor = self.divisor as f32;
        self.correlate(src)
            .into_iter()
            .map(|sum| clamp_u8(sum as f32 / divisor))
            .collect()
    }
}

#[inline]
fn clamp_index(i: isize, len: usize) -> usize {
    i.clamp(0, len as isize - 1) as usize
}

/// Round half away from zero and saturate into `0..=255`.
#[inline]
pub(crate) fn clamp_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
