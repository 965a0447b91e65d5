//! Pure calculation functions for crop geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! ## Rounding
//!
//! Sizes and centering offsets are rounded independently with
//! [`f64::round`] (half away from zero). When the slack on the cropped axis
//! is odd, the rectangle ends up one pixel closer to one edge than the other.

use super::backend::Dimensions;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CropError {
    #[error("Invalid dimensions: source {source_w}x{source_h}, target {target_w}x{target_h}")]
    InvalidDimensions {
        source_w: u32,
        source_h: u32,
        target_w: u32,
        target_h: u32,
    },
}

/// Final output size of a crop job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl TargetSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Crop rectangle in source pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    /// Whether this rectangle covers the whole source image.
    pub fn is_full(&self, source: Dimensions) -> bool {
        self.left == 0
            && self.top == 0
            && self.width == source.width
            && self.height == source.height
    }
}

/// Compute the largest centered rectangle of `target`'s aspect ratio that
/// fits inside `source`.
///
/// A source relatively wider than the target keeps its full height and loses
/// columns on both sides; otherwise it keeps its full width and loses rows.
/// Equal aspect ratios take the second branch and yield the full image.
///
/// # Examples
/// ```
/// # use casepics::imaging::{Dimensions, TargetSize, plan_crop};
/// let rect = plan_crop(
///     Dimensions { width: 4000, height: 2000 },
///     TargetSize::new(2800, 1800),
/// )
/// .unwrap();
/// assert_eq!((rect.left, rect.top, rect.width, rect.height), (445, 0, 3111, 2000));
/// ```
pub fn plan_crop(source: Dimensions, target: TargetSize) -> Result<CropRect, CropError> {
    if source.width == 0 || source.height == 0 || target.width == 0 || target.height == 0 {
        return Err(CropError::InvalidDimensions {
            source_w: source.width,
            source_h: source.height,
            target_w: target.width,
            target_h: target.height,
        });
    }

    let src_aspect = source.width as f64 / source.height as f64;
    let tgt_aspect = target.aspect();

    if src_aspect > tgt_aspect {
        // Source is wider: keep full height, trim the sides
        let height = source.height;
        let width = round_within(height as f64 * tgt_aspect, source.width);
        let left = ((source.width - width) as f64 / 2.0).round() as u32;
        Ok(CropRect {
            left,
            top: 0,
            width,
            height,
        })
    } else {
        // Source is taller or equal: keep full width, trim top and bottom
        let width = source.width;
        let height = round_within(width as f64 / tgt_aspect, source.height);
        let top = ((source.height - height) as f64 / 2.0).round() as u32;
        Ok(CropRect {
            left: 0,
            top,
            width,
            height,
        })
    }
}

/// Round to the nearest pixel, staying within `1..=max`.
fn round_within(value: f64, max: u32) -> u32 {
    (value.round() as u32).clamp(1, max)
}

/// A crop followed by an exact resize to the target size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizePlan {
    pub crop: CropRect,
    pub width: u32,
    pub height: u32,
    /// Source already has exactly the target size; pixels pass through.
    pub is_noop: bool,
}

/// Plan the crop and the final resize for one source image.
pub fn plan_resize(source: Dimensions, target: TargetSize) -> Result<ResizePlan, CropError> {
    let crop = plan_crop(source, target)?;
    Ok(ResizePlan {
        crop,
        width: target.width,
        height: target.height,
        is_noop: crop.is_full(source)
            && source.width == target.width
            && source.height == target.height,
    })
}

/// Percentage of bytes saved by re-encoding, rounded to one decimal.
///
/// Negative when the new file is larger. A zero-byte original yields 0.0.
pub fn savings_percent(original: u64, new: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    let pct = (1.0 - new as f64 / original as f64) * 100.0;
    (pct * 10.0).round() / 10.0
}
