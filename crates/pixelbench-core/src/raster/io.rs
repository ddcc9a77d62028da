//! Decode/encode boundary between image files and [`RasterBuffer`]s.
//!
//! Format handling is delegated entirely to the `image` crate; this module
//! only maps its pixel layouts onto 1-channel luma or 3-channel BGR rasters.

use image::{DynamicImage, GrayImage, RgbImage};
use std::path::Path;

use super::RasterBuffer;
use crate::error::{JobError, StageResult};

/// Decode an image file into a 1-channel (luma sources) or 3-channel BGR raster.
pub fn decode(path: &Path) -> StageResult<RasterBuffer> {
    let decode_err = |message: String| JobError::Decode {
        path: path.to_path_buf(),
        message,
    };

    let reader = image::ImageReader::open(path)
        .map_err(|e| decode_err(format!("Cannot open file: {}", e)))?
        .with_guessed_format()
        .map_err(|e| decode_err(format!("Cannot detect image format: {}", e)))?;
    let image = reader.decode().map_err(|e| decode_err(e.to_string()))?;

    from_dynamic(image)
}

/// Convert a decoded image into a raster.
pub fn from_dynamic(image: DynamicImage) -> StageResult<RasterBuffer> {
    match image {
        DynamicImage::ImageLuma8(gray) => {
            let (w, h) = gray.dimensions();
            RasterBuffer::new(w, h, 1, gray.into_raw())
        }
        DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageLumaA16(_) => {
            let gray = image.to_luma8();
            let (w, h) = gray.dimensions();
            RasterBuffer::new(w, h, 1, gray.into_raw())
        }
        other => {
            let rgb = other.to_rgb8();
            let (w, h) = rgb.dimensions();
            let mut data = rgb.into_raw();
            for px in data.chunks_exact_mut(3) {
                px.swap(0, 2);
            }
            RasterBuffer::new(w, h, 3, data)
        }
    }
}

/// Convert a 1- or 3-channel raster back into an `image` buffer.
pub fn to_dynamic(raster: RasterBuffer) -> StageResult<DynamicImage> {
    let (w, h, channels) = (raster.width(), raster.height(), raster.channels());
    let size_err =
        || JobError::InvalidImage(format!("raster {w}x{h}x{channels} is inconsistent"));
    match channels {
        1 => GrayImage::from_raw(w, h, raster.into_raw())
            .map(DynamicImage::ImageLuma8)
            .ok_or_else(size_err),
        3 => {
            let mut data = raster.into_raw();
            for px in data.chunks_exact_mut(3) {
                px.swap(0, 2);
            }
            RgbImage::from_raw(w, h, data)
                .map(DynamicImage::ImageRgb8)
                .ok_or_else(size_err)
        }
        n => Err(JobError::InvalidImage(format!(
            "cannot encode a {n}-channel raster"
        ))),
    }
}

/// Encode a raster to `path`; the format follows the file extension.
pub fn encode(raster: RasterBuffer, path: &Path) -> StageResult<()> {
    let image = to_dynamic(raster)?;
    image.save(path).map_err(|e| JobError::Encode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_color_decode_is_bgr() {
        let mut img = RgbImage::new(1, 1);
        img.put_pixel(0, 0, Rgb([10, 20, 30]));
        let raster = from_dynamic(DynamicImage::ImageRgb8(img)).unwrap();
        assert_eq!(raster.channels(), 3);
        assert_eq!(raster.as_raw(), &[30, 20, 10]);
    }

    #[test]
    fn test_luma_decode_is_single_channel() {
        let img = GrayImage::from_pixel(3, 2, image::Luma([7]));
        let raster = from_dynamic(DynamicImage::ImageLuma8(img)).unwrap();
        assert_eq!(raster.channels(), 1);
        assert_eq!(raster.pixel_count(), 6);
    }

    #[test]
    fn test_encode_then_decode_png_preserves_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let raster = RasterBuffer::new(2, 1, 3, vec![1, 2, 3, 250, 128, 0]).unwrap();
        encode(raster.clone(), &path).unwrap();
        assert_eq!(decode(&path).unwrap(), raster);
    }

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();
        assert!(matches!(decode(&path), Err(JobError::Decode { .. })));
    }

    #[test]
    fn test_encode_to_missing_directory_is_encode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");
        let raster = RasterBuffer::filled(2, 2, 1, 9).unwrap();
        assert!(matches!(encode(raster, &path), Err(JobError::Encode { .. })));
    }

    #[test]
    fn test_encode_rejects_four_channels() {
        let dir = tempfile::tempdir().unwrap();
        let raster = RasterBuffer::filled(2, 2, 4, 0).unwrap();
        let result = encode(raster, &dir.path().join("x.png"));
        assert!(matches!(result, Err(JobError::InvalidImage(_))));
    }
}
