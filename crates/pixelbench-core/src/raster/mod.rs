//! In-memory pixel grids passed between filter stages.
//!
//! A [`RasterBuffer`] is moved through the pipeline by value: every stage
//! consumes its input and returns the next buffer, so no two stages ever
//! alias the same pixels.

pub mod io;

use crate::error::{JobError, StageResult};

/// Interleaved, row-major 8-bit pixel grid.
///
/// Colour buffers use B,G,R channel order to match the decode boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<u8>,
}

impl RasterBuffer {
    /// Wrap raw interleaved pixels, checking dimensions against the data length.
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<u8>) -> StageResult<Self> {
        if width == 0 || height == 0 {
            return Err(JobError::InvalidImage(format!(
                "empty raster ({width}x{height})"
            )));
        }
        if channels == 0 {
            return Err(JobError::InvalidImage("raster has 0 channels".into()));
        }
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(JobError::InvalidImage(format!(
                "raster {width}x{height}x{channels} needs {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// A raster with every sample set to `value`.
    pub fn filled(width: u32, height: u32, channels: u8, value: u8) -> StageResult<Self> {
        let len = width as usize * height as usize * channels as usize;
        Self::new(width, height, channels, vec![value; len])
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Number of pixels (width × height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Raw interleaved samples.
    #[inline]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Sample at `(x, y)` in channel `c`.
    #[inline]
    pub fn sample(&self, x: usize, y: usize, c: usize) -> u8 {
        let ch = self.channels as usize;
        self.data[(y * self.width as usize + x) * ch + c]
    }

    /// Consume the buffer, returning its samples.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Fail with `InvalidImage` unless the buffer has one of `allowed` channel counts.
    pub(crate) fn require_channels(&self, stage: &str, allowed: &[u8]) -> StageResult<()> {
        if allowed.contains(&self.channels) {
            Ok(())
        } else {
            Err(JobError::InvalidImage(format!(
                "{stage} requires {allowed:?} channel(s), got {}",
                self.channels
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_length_mismatch() {
        let err = RasterBuffer::new(2, 2, 3, vec![0; 11]).unwrap_err();
        assert!(matches!(err, JobError::InvalidImage(_)));
    }

    #[test]
    fn test_new_rejects_empty_dimensions() {
        assert!(RasterBuffer::new(0, 4, 1, vec![]).is_err());
        assert!(RasterBuffer::new(4, 4, 0, vec![]).is_err());
    }

    #[test]
    fn test_sample_indexing_is_interleaved() {
        // 2x1 BGR: pixel 0 = (1,2,3), pixel 1 = (4,5,6)
        let buf = RasterBuffer::new(2, 1, 3, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(buf.sample(1, 0, 0), 4);
        assert_eq!(buf.sample(0, 0, 2), 3);
        assert_eq!(buf.pixel_count(), 2);
    }

    #[test]
    fn test_require_channels() {
        let buf = RasterBuffer::filled(3, 3, 4, 0).unwrap();
        let err = buf.require_channels("grayscale", &[1, 3]).unwrap_err();
        assert!(err.to_string().contains("grayscale"));
    }
}
