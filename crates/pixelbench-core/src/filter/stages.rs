//! The five pixel transforms of the pipeline.
//!
//! Each function consumes its input raster and returns a new one. None of
//! them reads or writes anything besides those two buffers.

use super::kernel::{clamp_u8, FilterKernel};
use crate::error::StageResult;
use crate::raster::RasterBuffer;

/// Luminance weights in B, G, R order.
pub const LUMA_WEIGHTS_BGR: [f32; 3] = [0.114, 0.587, 0.299];

/// Default factor for [`brightness_scale`].
pub const DEFAULT_BRIGHTNESS_FACTOR: f64 = 1.2;

/// Reduce a BGR raster to one luminance channel. Single-channel input is
/// returned unchanged.
pub fn grayscale(src: RasterBuffer) -> StageResult<RasterBuffer> {
    src.require_channels("grayscale", &[1, 3])?;
    if src.channels() == 1 {
        return Ok(src);
    }

    let [wb, wg, wr] = LUMA_WEIGHTS_BGR;
    let (width, height) = (src.width(), src.height());
    let data = src
        .as_raw()
        .chunks_exact(3)
        .map(|px| clamp_u8(wb * px[0] as f32 + wg * px[1] as f32 + wr * px[2] as f32))
        .collect();
    RasterBuffer::new(width, height, 1, data)
}

/// 3×3 binomial blur, per channel.
pub fn smooth(src: RasterBuffer) -> StageResult<RasterBuffer> {
    convolve(src, &FilterKernel::smooth())
}

/// Sobel gradient magnitude `sqrt(Gx² + Gy²)` of a single-channel raster.
pub fn edge_magnitude(src: RasterBuffer) -> StageResult<RasterBuffer> {
    src.require_channels("edge magnitude", &[1])?;

    let gx = FilterKernel::sobel_x().correlate(&src);
    let gy = FilterKernel::sobel_y().correlate(&src);
    let data = gx
        .iter()
        .zip(&gy)
        .map(|(&x, &y)| {
            let (x, y) = (x as f32, y as f32);
            clamp_u8((x * x + y * y).sqrt())
        })
        .collect();
    RasterBuffer::new(src.width(), src.height(), 1, data)
}

/// Unity-gain 3×3 sharpen, per channel.
pub fn sharpen(src: RasterBuffer) -> StageResult<RasterBuffer> {
    convolve(src, &FilterKernel::sharpen())
}

/// Linear remap `clamp(round(v × factor))`, per sample.
pub fn brightness_scale(src: RasterBuffer, factor: f64) -> StageResult<RasterBuffer> {
    let (width, height, channels) = (src.width(), src.height(), src.channels());
    let mut data = src.into_raw();
    for v in data.iter_mut() {
        *v = (*v as f64 * factor).round().clamp(0.0, 255.0) as u8;
    }
    RasterBuffer::new(width, height, channels, data)
}

fn convolve(src: RasterBuffer, kernel: &FilterKernel) -> StageResult<RasterBuffer> {
    let data = kernel.apply(&src);
    RasterBuffer::new(src.width(), src.height(), src.channels(), data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JobError;

    fn gradient_bgr(width: u32, height: u32) -> RasterBuffer {
        let mut data = Vec::new();
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[(x * 40) as u8, (y * 30) as u8, ((x + y) * 17) as u8]);
            }
        }
        RasterBuffer::new(width, height, 3, data).unwrap()
    }

    #[test]
    fn test_luma_weights_sum_to_one() {
        let sum: f32 = LUMA_WEIGHTS_BGR.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_grayscale_uses_bgr_weights() {
        // Pure red in BGR order.
        let red = RasterBuffer::new(1, 1, 3, vec![0, 0, 255]).unwrap();
        assert_eq!(grayscale(red).unwrap().as_raw(), &[76]); // 0.299 * 255 = 76.245
        let blue = RasterBuffer::new(1, 1, 3, vec![255, 0, 0]).unwrap();
        assert_eq!(grayscale(blue).unwrap().as_raw(), &[29]); // 0.114 * 255 = 29.07
        let white = RasterBuffer::filled(1, 1, 3, 255).unwrap();
        assert_eq!(grayscale(white).unwrap().as_raw(), &[255]);
    }

    #[test]
    fn test_grayscale_is_idempotent() {
        let once = grayscale(gradient_bgr(5, 4)).unwrap();
        let twice = grayscale(once.clone()).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.channels(), 1);
    }

    #[test]
    fn test_grayscale_rejects_two_channels() {
        let src = RasterBuffer::filled(2, 2, 2, 0).unwrap();
        assert!(matches!(grayscale(src), Err(JobError::InvalidImage(_))));
    }

    #[test]
    fn test_smooth_preserves_uniform_field() {
        let src = RasterBuffer::filled(6, 3, 3, 77).unwrap();
        assert_eq!(smooth(src.clone()).unwrap(), src);
    }

    #[test]
    fn test_sharpen_preserves_uniform_field() {
        for value in [0, 1, 128, 255] {
            let src = RasterBuffer::filled(7, 5, 1, value).unwrap();
            assert_eq!(sharpen(src.clone()).unwrap(), src);
        }
    }

    #[test]
    fn test_sharpen_clamps_overshoot() {
        // Bright centre on dark background: 5 * 200 = 1000 -> 255.
        let mut data = vec![0u8; 9];
        data[4] = 200;
        let src = RasterBuffer::new(3, 3, 1, data).unwrap();
        let out = sharpen(src).unwrap();
        assert_eq!(out.sample(1, 1, 0), 255);
        assert_eq!(out.sample(0, 1, 0), 0);
    }

    #[test]
    fn test_edge_magnitude_of_uniform_is_zero() {
        let src = RasterBuffer::filled(8, 8, 1, 200).unwrap();
        let out = edge_magnitude(src).unwrap();
        assert!(out.as_raw().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_edge_magnitude_uses_euclidean_norm() {
        // Diagonal corner: at the centre Gx = 30, Gy = 30 -> sqrt(1800) = 42.43 -> 42.
        let src = RasterBuffer::new(3, 3, 1, vec![0, 0, 0, 0, 0, 10, 0, 10, 10]).unwrap();
        let gx = FilterKernel::sobel_x().correlate(&src)[4];
        let gy = FilterKernel::sobel_y().correlate(&src)[4];
        assert_eq!((gx, gy), (30, 30));
        let out = edge_magnitude(src).unwrap();
        assert_eq!(out.sample(1, 1, 0), 42);
    }

    #[test]
    fn test_edge_magnitude_requires_single_channel() {
        let src = RasterBuffer::filled(4, 4, 3, 10).unwrap();
        assert!(matches!(edge_magnitude(src), Err(JobError::InvalidImage(_))));
    }

    #[test]
    fn test_brightness_identity_at_factor_one() {
        let src = gradient_bgr(6, 6);
        assert_eq!(brightness_scale(src.clone(), 1.0).unwrap(), src);
    }

    #[test]
    fn test_brightness_rounds_and_saturates() {
        let src = RasterBuffer::new(3, 1, 1, vec![10, 100, 250]).unwrap();
        let out = brightness_scale(src, DEFAULT_BRIGHTNESS_FACTOR).unwrap();
        assert_eq!(out.as_raw(), &[12, 120, 255]);
    }

    #[test]
    fn test_single_pixel_through_every_stage() {
        let src = RasterBuffer::new(1, 1, 3, vec![5, 120, 240]).unwrap();
        let out = grayscale(src).unwrap();
        let out = smooth(out).unwrap();
        let out = edge_magnitude(out).unwrap();
        let out = sharpen(out).unwrap();
        let out = brightness_scale(out, 1.2).unwrap();
        assert_eq!((out.width(), out.height(), out.channels()), (1, 1, 1));
        assert_eq!(out.as_raw(), &[0]);
    }
}
