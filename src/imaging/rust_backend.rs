//! Pure Rust image processing backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::image_dimensions` (header only) |
//! | Decode (JPEG, PNG) | `image::ImageReader` |
//! | Crop | `DynamicImage::crop_imm` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Modulate / gamma | [`color::adjust_image`](super::color::adjust_image) |
//! | Encode → PNG | `PngEncoder::new_with_quality` |
//! | Encode → JPEG | `JpegEncoder::new_with_quality` |
//!
//! Every rewrite encodes into memory first, writes a sibling temp file and
//! renames it over the original, so a failed encode leaves the source intact.

use super::backend::{BackendError, Dimensions, ImageBackend, Written};
use super::color;
use super::params::{AdjustParams, CropResizeParams, EncodeSettings, PngSettings, ReencodeParams};
use crate::types::ImageKind;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, ImageFormat, ImageReader};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

const CANDIDATES: &[(&str, ImageFormat)] = &[
    ("png", ImageFormat::Png),
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled() && fmt.writing_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the image file extensions that can be both decoded and re-encoded.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn kind_of(path: &Path) -> Result<ImageKind, BackendError> {
    ImageKind::from_path(path).ok_or_else(|| BackendError::UnsupportedFormat(path.to_path_buf()))
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| BackendError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Map a zlib-style level onto the encoder's presets.
fn png_compression(level: u8) -> CompressionType {
    match level {
        0..=3 => CompressionType::Fast,
        4..=6 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

fn encode_png(img: &DynamicImage, settings: PngSettings) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    let filter = if settings.adaptive_filtering {
        PngFilter::Adaptive
    } else {
        PngFilter::NoFilter
    };
    let encoder =
        PngEncoder::new_with_quality(&mut buf, png_compression(settings.compression_level), filter);
    img.write_with_encoder(encoder)?;
    Ok(buf)
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    // JPEG has no alpha and no 16-bit mode
    match img.color() {
        ColorType::L8 | ColorType::Rgb8 => img.write_with_encoder(encoder)?,
        _ => DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)?,
    }
    Ok(buf)
}

/// Encode `img` in the format of `path`'s extension.
fn encode(img: &DynamicImage, path: &Path, settings: &EncodeSettings) -> Result<Vec<u8>, BackendError> {
    let result = match kind_of(path)? {
        ImageKind::Png => encode_png(img, settings.png),
        ImageKind::Jpeg => encode_jpeg(img, settings.jpeg.value()),
    };
    result.map_err(|e| BackendError::Encode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.casepics-tmp"))
}

/// Atomically replace `path` with `bytes`.
fn replace_file(path: &Path, bytes: &[u8]) -> Result<Written, BackendError> {
    let original_bytes = fs::metadata(path)?.len();
    let tmp = temp_sibling(path);
    if let Err(e) = fs::write(&tmp, bytes).and_then(|_| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(BackendError::Io(e));
    }
    Ok(Written {
        original_bytes,
        bytes: bytes.len() as u64,
    })
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| match e {
            image::ImageError::IoError(io) => BackendError::Io(io),
            other => BackendError::Decode {
                path: path.to_path_buf(),
                message: other.to_string(),
            },
        })?;
        Ok(Dimensions { width, height })
    }

    fn crop_resize(&self, params: &CropResizeParams) -> Result<Written, BackendError> {
        kind_of(&params.path)?;
        let img = load_image(&params.path)?;
        let rect = params.crop;

        let cropped = if rect.left == 0
            && rect.top == 0
            && rect.width == img.width()
            && rect.height == img.height()
        {
            img
        } else {
            img.crop_imm(rect.left, rect.top, rect.width, rect.height)
        };

        let resized = if cropped.width() == params.width && cropped.height() == params.height {
            cropped
        } else {
            cropped.resize_exact(params.width, params.height, FilterType::Lanczos3)
        };

        let bytes = encode(&resized, &params.path, &params.encode)?;
        replace_file(&params.path, &bytes)
    }

    fn adjust(&self, params: &AdjustParams) -> Result<Written, BackendError> {
        kind_of(&params.path)?;
        let img = load_image(&params.path)?;
        let adjusted = color::adjust_image(img, &params.modulation, params.gamma);
        let bytes = encode(&adjusted, &params.path, &params.encode)?;
        replace_file(&params.path, &bytes)
    }

    fn reencode(&self, params: &ReencodeParams) -> Result<Written, BackendError> {
        kind_of(&params.path)?;
        let img = load_image(&params.path)?;
        let bytes = encode(&img, &params.path, &params.encode)?;
        replace_file(&params.path, &bytes)
    }
}
