//! Image processing in pure Rust, on top of the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Crop + resize** | [`plan_crop`] geometry, `crop_imm` + Lanczos3 `resize_exact` |
//! | **Color adjust** | Oklab modulate + gamma LUT ([`color`]) |
//! | **Re-encode** | `PngEncoder` / `JpegEncoder` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for crop geometry (unit testable)
//! - **Color**: Pure per-pixel color math
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod color;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend, Written};
pub use calculations::{
    CropError, CropRect, ResizePlan, TargetSize, plan_crop, plan_resize, savings_percent,
};
pub use operations::{
    AdjustConfig, CompressOutcome, CropConfig, CropOutcome, OperationError, adjust_colors,
    compress, crop_to_target, get_dimensions, plan_crop_for,
};
pub use params::{
    AdjustParams, CropResizeParams, EncodeSettings, Modulation, PngSettings, Quality,
    ReencodeParams,
};
pub use rust_backend::{RustBackend, supported_input_extensions};
