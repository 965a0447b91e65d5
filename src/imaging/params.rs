//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides what to do with each file) and the
//! [`backend`](super::backend) (which does the actual pixel work). This
//! separation allows swapping backends (e.g. for testing with a mock) without
//! changing operation logic.
//!
//! ## Types
//!
//! - [`Quality`]: JPEG encoding quality (1–100). Clamped on construction.
//! - [`PngSettings`]: zlib level (0–9) and adaptive row filtering.
//! - [`EncodeSettings`]: how to re-encode a file, per output format.
//! - [`Modulation`]: brightness/saturation/hue multipliers.
//! - [`CropResizeParams`], [`AdjustParams`], [`ReencodeParams`]: full
//!   specification of one in-place rewrite.

use super::calculations::CropRect;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Quality setting for JPEG encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(95)
    }
}

/// PNG encoder settings.
///
/// `compression_level` follows the zlib scale: 0–3 favours speed, 7–9
/// favours size. Adaptive filtering picks the best row filter per scanline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PngSettings {
    pub compression_level: u8,
    pub adaptive_filtering: bool,
}

impl PngSettings {
    /// Low compression, used where the file is being rewritten for quality.
    pub fn fast() -> Self {
        Self {
            compression_level: 1,
            adaptive_filtering: true,
        }
    }

    /// Maximum compression, used by the compress job.
    pub fn smallest() -> Self {
        Self {
            compression_level: 9,
            adaptive_filtering: true,
        }
    }
}

impl Default for PngSettings {
    fn default() -> Self {
        Self::fast()
    }
}

/// Per-format encoding for an in-place rewrite. The output format always
/// matches the input file's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeSettings {
    pub png: PngSettings,
    pub jpeg: Quality,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            png: PngSettings::fast(),
            jpeg: Quality::default(),
        }
    }
}

/// Lightness/chroma multipliers and hue rotation.
///
/// `brightness = 1.0`, `saturation = 1.0`, `hue = 0.0` is the identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Modulation {
    pub brightness: f32,
    pub saturation: f32,
    /// Hue rotation in degrees.
    pub hue: f32,
}

impl Modulation {
    pub fn identity() -> Self {
        Self {
            brightness: 1.0,
            saturation: 1.0,
            hue: 0.0,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }
}

impl Default for Modulation {
    fn default() -> Self {
        Self::identity()
    }
}

/// Crop to `crop`, resize to exactly `width`×`height`, rewrite in place.
#[derive(Debug, Clone, PartialEq)]
pub struct CropResizeParams {
    pub path: PathBuf,
    pub crop: CropRect,
    pub width: u32,
    pub height: u32,
    pub encode: EncodeSettings,
}

/// Modulate then gamma-correct, rewrite in place.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustParams {
    pub path: PathBuf,
    pub modulation: Modulation,
    pub gamma: f32,
    pub encode: EncodeSettings,
}

/// Decode and re-encode with new settings, rewrite in place.
#[derive(Debug, Clone, PartialEq)]
pub struct ReencodeParams {
    pub path: PathBuf,
    pub encode: EncodeSettings,
}
