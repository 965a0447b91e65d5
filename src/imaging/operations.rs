//! High-level image operations.
//!
//! These functions combine calculations with backend execution. Each one
//! handles a single file: it takes configuration, computes parameters, calls
//! the backend, and reports what happened. Batching and failure isolation
//! live in [`process`](crate::process).

use super::backend::{BackendError, Dimensions, ImageBackend, Written};
use super::calculations::{CropError, ResizePlan, TargetSize, plan_resize, savings_percent};
use super::params::{AdjustParams, CropResizeParams, EncodeSettings, Modulation, ReencodeParams};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OperationError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Crop(#[from] CropError),
}

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, OperationError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<Dimensions> {
    Ok(backend.identify(path)?)
}

/// Configuration for the crop job.
#[derive(Debug, Clone)]
pub struct CropConfig {
    pub target: TargetSize,
    pub encode: EncodeSettings,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            target: TargetSize::new(2800, 1800),
            encode: EncodeSettings::default(),
        }
    }
}

/// What a crop did to one file.
#[derive(Debug, Clone, PartialEq)]
pub struct CropOutcome {
    pub source: Dimensions,
    pub plan: ResizePlan,
    /// `None` for a dry run.
    pub written: Option<Written>,
}

/// Plan a crop for one file without touching it.
pub fn plan_crop_for(
    backend: &impl ImageBackend,
    path: &Path,
    config: &CropConfig,
) -> Result<CropOutcome> {
    let source = get_dimensions(backend, path)?;
    let plan = plan_resize(source, config.target)?;
    Ok(CropOutcome {
        source,
        plan,
        written: None,
    })
}

/// Center-crop one file to the target aspect ratio and resize it to the
/// target size, in place.
pub fn crop_to_target(
    backend: &impl ImageBackend,
    path: &Path,
    config: &CropConfig,
) -> Result<CropOutcome> {
    let mut outcome = plan_crop_for(backend, path, config)?;
    tracing::debug!(
        path = %path.display(),
        source = ?outcome.source,
        crop = ?outcome.plan.crop,
        "planned crop"
    );
    let written = backend.crop_resize(&CropResizeParams {
        path: path.to_path_buf(),
        crop: outcome.plan.crop,
        width: outcome.plan.width,
        height: outcome.plan.height,
        encode: config.encode,
    })?;
    outcome.written = Some(written);
    Ok(outcome)
}

/// Configuration for a color adjustment job.
#[derive(Debug, Clone)]
pub struct AdjustConfig {
    pub modulation: Modulation,
    pub gamma: f32,
    pub encode: EncodeSettings,
}

/// Modulate and gamma-correct one file in place.
pub fn adjust_colors(
    backend: &impl ImageBackend,
    path: &Path,
    config: &AdjustConfig,
) -> Result<Written> {
    Ok(backend.adjust(&AdjustParams {
        path: path.to_path_buf(),
        modulation: config.modulation,
        gamma: config.gamma,
        encode: config.encode,
    })?)
}

/// Size change from recompressing one file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressOutcome {
    pub original_bytes: u64,
    pub new_bytes: u64,
    pub savings_percent: f64,
}

/// Re-encode one file in place with the compression settings.
pub fn compress(
    backend: &impl ImageBackend,
    path: &Path,
    encode: &EncodeSettings,
) -> Result<CompressOutcome> {
    let written = backend.reencode(&ReencodeParams {
        path: path.to_path_buf(),
        encode: *encode,
    })?;
    Ok(CompressOutcome {
        original_bytes: written.original_bytes,
        new_bytes: written.bytes,
        savings_percent: savings_percent(written.original_bytes, written.bytes),
    })
}
