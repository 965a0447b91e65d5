//! Batch configuration module.
//!
//! Handles loading, validating, and merging `casepics.toml`. Every tuning
//! constant of the batch jobs lives here as a named field; user config files
//! override stock defaults key by key.
//!
//! ## Config File Location
//!
//! `casepics.toml` in the working directory is picked up automatically. A
//! different file can be passed with `--config`.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [paths]
//! cases_dir = "public/pics/casesPics"  # crop, brighten, fix-colors
//! pics_dir = "public/pics"             # compress (recursive)
//!
//! [crop]
//! target_width = 2800
//! target_height = 1800
//! extensions = ["png"]
//!
//! [crop.png]
//! compression_level = 1
//! adaptive_filtering = true
//!
//! [brighten]
//! brightness = 1.2
//! saturation = 1.0
//! hue = 0.0
//! gamma = 1.1
//! gamma_lift = false   # gamma only takes effect when true
//! jpeg_quality = 95
//! extensions = ["png", "jpg", "jpeg"]
//! skip_files = ["already-light.png"]
//!
//! [fix_colors]
//! brightness = 0.75
//! saturation = 1.2
//! gamma = 1.2
//! gamma_lift = false
//! extensions = ["png"]
//!
//! [compress]
//! jpeg_quality = 85
//! extensions = ["png", "jpg", "jpeg"]
//!
//! [compress.png]
//! compression_level = 9
//!
//! [processing]
//! max_processes = 4   # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{
    AdjustConfig, CropConfig, EncodeSettings, Modulation, PngSettings, Quality, TargetSize,
};
use crate::types::ImageKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILENAME: &str = "casepics.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Batch configuration loaded from `casepics.toml`.
///
/// Every field has a stock default. Unknown
/// keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    /// Directories the jobs operate on.
    pub paths: PathsConfig,
    /// Center-crop job settings.
    pub crop: CropSection,
    /// Brighten job settings.
    pub brighten: AdjustSection,
    /// Color-fix job settings.
    pub fix_colors: AdjustSection,
    /// Recompression job settings.
    pub compress: CompressSection,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::stock()
    }
}

impl BatchConfig {
    /// Stock defaults with per-job tuning.
    pub fn stock() -> Self {
        Self {
            paths: PathsConfig::default(),
            crop: CropSection::default(),
            brighten: AdjustSection::brighten(),
            fix_colors: AdjustSection::fix_colors(),
            compress: CompressSection::default(),
            processing: ProcessingConfig::default(),
        }
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.crop.target_width == 0 || self.crop.target_height == 0 {
            return Err(ConfigError::Validation(
                "crop.target_width and crop.target_height must be non-zero".into(),
            ));
        }
        validate_png("crop.png", &self.crop.png)?;
        validate_extensions("crop.extensions", &self.crop.extensions)?;
        self.brighten.validate("brighten")?;
        self.fix_colors.validate("fix_colors")?;
        validate_png("compress.png", &self.compress.png)?;
        validate_quality("compress.jpeg_quality", self.compress.jpeg_quality)?;
        validate_extensions("compress.extensions", &self.compress.extensions)?;
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn validate_png(section: &str, png: &PngSettings) -> Result<(), ConfigError> {
    if png.compression_level > 9 {
        return Err(ConfigError::Validation(format!(
            "{section}.compression_level must be 0-9"
        )));
    }
    Ok(())
}

fn validate_quality(key: &str, quality: u32) -> Result<(), ConfigError> {
    if !(1..=100).contains(&quality) {
        return Err(ConfigError::Validation(format!("{key} must be 1-100")));
    }
    Ok(())
}

fn validate_extensions(key: &str, extensions: &[String]) -> Result<(), ConfigError> {
    if extensions.is_empty() {
        return Err(ConfigError::Validation(format!("{key} must not be empty")));
    }
    if let Some(bad) = extensions
        .iter()
        .find(|e| ImageKind::from_extension(e).is_none())
    {
        return Err(ConfigError::Validation(format!(
            "{key}: unsupported extension \"{bad}\" (expected png, jpg or jpeg)"
        )));
    }
    Ok(())
}

/// Directories the jobs operate on, relative to the working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Case images: target of crop, brighten and fix-colors.
    pub cases_dir: PathBuf,
    /// All site images: target of compress, scanned recursively.
    pub pics_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            cases_dir: PathBuf::from("public/pics/casesPics"),
            pics_dir: PathBuf::from("public/pics"),
        }
    }
}

/// Center-crop job settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CropSection {
    pub target_width: u32,
    pub target_height: u32,
    pub extensions: Vec<String>,
    pub png: PngSettings,
}

impl Default for CropSection {
    fn default() -> Self {
        Self {
            target_width: 2800,
            target_height: 1800,
            extensions: vec!["png".into()],
            png: PngSettings::fast(),
        }
    }
}

impl CropSection {
    pub fn to_crop_config(&self) -> CropConfig {
        CropConfig {
            target: TargetSize::new(self.target_width, self.target_height),
            encode: EncodeSettings {
                png: self.png,
                jpeg: Quality::new(100),
            },
        }
    }
}

/// Settings for a modulate + gamma job (brighten, fix_colors).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdjustSection {
    /// Lightness multiplier (1.0 = unchanged, <1.0 = darker).
    pub brightness: f32,
    /// Chroma multiplier (1.0 = unchanged, >1.0 = more saturated).
    pub saturation: f32,
    /// Hue rotation in degrees.
    pub hue: f32,
    /// Gamma for the optional mid-tone lift (1.0-3.0).
    pub gamma: f32,
    /// Apply `gamma` after modulation. Off by default: without a resize the
    /// gamma round trip cancels out, so stock jobs are modulation only.
    pub gamma_lift: bool,
    /// JPEG quality for `.jpg`/`.jpeg` files (1-100).
    pub jpeg_quality: u32,
    pub extensions: Vec<String>,
    /// File names (not paths) to leave untouched.
    pub skip_files: Vec<String>,
    pub png: PngSettings,
}

impl Default for AdjustSection {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            saturation: 1.0,
            hue: 0.0,
            gamma: 1.0,
            gamma_lift: false,
            jpeg_quality: 95,
            extensions: vec!["png".into()],
            skip_files: Vec::new(),
            png: PngSettings::fast(),
        }
    }
}

impl AdjustSection {
    pub fn brighten() -> Self {
        Self {
            brightness: 1.2,
            saturation: 1.0,
            gamma: 1.1,
            extensions: vec!["png".into(), "jpg".into(), "jpeg".into()],
            skip_files: vec![
                "Our-Landscape-Designs-Oxshott-Garden-Plan-Ourlandscapedesigns.com_-min-min.png"
                    .into(),
                "Our-Landscape-Designs-garden-design-designer-Ourlandscapedesigns.com-copy-min-min.jpg"
                    .into(),
            ],
            ..Self::default()
        }
    }

    pub fn fix_colors() -> Self {
        Self {
            brightness: 0.75,
            saturation: 1.2,
            gamma: 1.2,
            ..Self::default()
        }
    }

    fn validate(&self, section: &str) -> Result<(), ConfigError> {
        if self.brightness.is_nan() || self.brightness <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "{section}.brightness must be greater than 0"
            )));
        }
        if self.saturation.is_nan() || self.saturation < 0.0 {
            return Err(ConfigError::Validation(format!(
                "{section}.saturation must not be negative"
            )));
        }
        if !(1.0..=3.0).contains(&self.gamma) {
            return Err(ConfigError::Validation(format!(
                "{section}.gamma must be between 1.0 and 3.0"
            )));
        }
        if !self.hue.is_finite() {
            return Err(ConfigError::Validation(format!("{section}.hue must be finite")));
        }
        validate_quality(&format!("{section}.jpeg_quality"), self.jpeg_quality)?;
        validate_png(&format!("{section}.png"), &self.png)?;
        validate_extensions(&format!("{section}.extensions"), &self.extensions)
    }

    pub fn to_adjust_config(&self) -> AdjustConfig {
        AdjustConfig {
            modulation: Modulation {
                brightness: self.brightness,
                saturation: self.saturation,
                hue: self.hue,
            },
            gamma: if self.gamma_lift { self.gamma } else { 1.0 },
            encode: EncodeSettings {
                png: self.png,
                jpeg: Quality::new(self.jpeg_quality),
            },
        }
    }
}

/// Recompression job settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressSection {
    pub jpeg_quality: u32,
    pub extensions: Vec<String>,
    pub png: PngSettings,
}

impl Default for CompressSection {
    fn default() -> Self {
        Self {
            jpeg_quality: 85,
            extensions: vec!["png".into(), "jpg".into(), "jpeg".into()],
            png: PngSettings::smallest(),
        }
    }
}

impl CompressSection {
    pub fn encode_settings(&self) -> EncodeSettings {
        EncodeSettings {
            png: self.png,
            jpeg: Quality::new(self.jpeg_quality),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(BatchConfig::stock())
        .map_err(|e| ConfigError::Validation(format!("stock config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(config_path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<BatchConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: BatchConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the batch config.
///
/// With an explicit path the file must exist. Without one, `casepics.toml`
/// in `dir` is used when present and stock defaults otherwise.
pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<BatchConfig, ConfigError> {
    let overlay = match explicit {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Some(toml::from_str(&content)?)
        }
        None => load_raw_config(&dir.join(CONFIG_FILENAME))?,
    };
    resolve_config(stock_defaults_value()?, overlay)
}

/// Returns a fully-commented stock `casepics.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# casepics configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Directories (relative to the working directory)
# ---------------------------------------------------------------------------
[paths]
# Case images: crop, brighten and fix-colors operate here (not recursive).
cases_dir = "public/pics/casesPics"
# All site images: compress walks this tree recursively.
pics_dir = "public/pics"

# ---------------------------------------------------------------------------
# crop: center-crop to the target aspect ratio, then resize to exactly
# target_width x target_height (Lanczos3).
# ---------------------------------------------------------------------------
[crop]
target_width = 2800
target_height = 1800
extensions = ["png"]

[crop.png]
# zlib level 0-9 (low = fast and large, high = slow and small).
compression_level = 1
adaptive_filtering = true

# ---------------------------------------------------------------------------
# brighten: lift lightness and mid-tones.
# ---------------------------------------------------------------------------
[brighten]
brightness = 1.2          # Lightness multiplier (1.0 = unchanged)
saturation = 1.0          # Chroma multiplier (1.0 = unchanged)
hue = 0.0                 # Hue rotation in degrees
gamma = 1.1               # 1.0-3.0, values above 1.0 lift mid-tones
gamma_lift = false        # Apply gamma after modulation (off = modulation only)
jpeg_quality = 95
extensions = ["png", "jpg", "jpeg"]
# Files that already have a light background.
skip_files = [
    "Our-Landscape-Designs-Oxshott-Garden-Plan-Ourlandscapedesigns.com_-min-min.png",
    "Our-Landscape-Designs-garden-design-designer-Ourlandscapedesigns.com-copy-min-min.jpg",
]

[brighten.png]
compression_level = 1
adaptive_filtering = true

# ---------------------------------------------------------------------------
# fix-colors: darker, more saturated, more contrast.
# ---------------------------------------------------------------------------
[fix_colors]
brightness = 0.75
saturation = 1.2
hue = 0.0
gamma = 1.2
gamma_lift = false
jpeg_quality = 95
extensions = ["png"]
skip_files = []

[fix_colors.png]
compression_level = 1
adaptive_filtering = true

# ---------------------------------------------------------------------------
# compress: re-encode every image under pics_dir.
# ---------------------------------------------------------------------------
[compress]
jpeg_quality = 85
extensions = ["png", "jpg", "jpeg"]

[compress.png]
compression_level = 9
adaptive_filtering = true

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image-processing workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
