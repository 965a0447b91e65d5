//! Shared test utilities for the casepics test suite.
//!
//! Writes small real images to disk so backend and batch tests can run the
//! full decode → transform → encode path without fixture files.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_cases_dir(&[("wide.png", 400, 200), ("tall.jpg", 100, 300)]);
//! let png = tmp.path().join("wide.png");
//! assert_eq!(image::image_dimensions(&png).unwrap(), (400, 200));
//! ```

use image::{ImageFormat, Rgb, RgbImage};
use std::path::Path;
use tempfile::TempDir;

/// A deterministic RGB gradient with some texture, so encoders have real
/// work to do and resampling has something to blur.
pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.max(1)) as u8;
        let g = (y * 255 / height.max(1)) as u8;
        let b = ((x ^ y) & 0xff) as u8;
        Rgb([r, g, b])
    })
}

/// Write a gradient PNG of the given size.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    gradient_image(width, height)
        .save_with_format(path, ImageFormat::Png)
        .unwrap();
}

/// Write a gradient JPEG of the given size.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    gradient_image(width, height)
        .save_with_format(path, ImageFormat::Jpeg)
        .unwrap();
}

/// Create a temp directory holding one image per `(name, width, height)`.
///
/// The format follows the extension: `.png` gets a PNG, anything else a JPEG.
pub fn setup_cases_dir(images: &[(&str, u32, u32)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (name, width, height) in images {
        let path = tmp.path().join(name);
        if name.to_ascii_lowercase().ends_with(".png") {
            create_test_png(&path, *width, *height);
        } else {
            create_test_jpeg(&path, *width, *height);
        }
    }
    tmp
}

/// File size on disk. Panics if the file is missing.
pub fn file_len(path: &Path) -> u64 {
    std::fs::metadata(path)
        .unwrap_or_else(|e| panic!("{}: {e}", path.display()))
        .len()
}
