//! Fixture helpers shared by unit tests.

use image::{Rgb, RgbImage};
use std::path::Path;

/// Write `count` small colour PNGs named `sample_00.png`, `sample_01.png`, ...
pub(crate) fn write_sample_images(dir: &Path, count: usize) {
    for i in 0..count {
        let img = RgbImage::from_fn(24, 16, |x, y| {
            let v = ((x * 10 + y * 7 + i as u32 * 31) % 256) as u8;
            if x > 12 {
                Rgb([v, 255 - v, 40])
            } else {
                Rgb([20, v / 2, v])
            }
        });
        img.save(dir.join(format!("sample_{i:02}.png"))).unwrap();
    }
}

/// Write a file with an image extension but no image inside.
pub(crate) fn write_corrupt(dir: &Path, name: &str) {
    std::fs::write(dir.join(name), b"\xff\xd8 truncated").unwrap();
}
