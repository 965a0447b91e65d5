//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the four operations every backend must
//! support: identify, crop_resize, adjust, and reencode. The last three all
//! rewrite the file in place.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate.

use super::params::{AdjustParams, CropResizeParams, ReencodeParams};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },
    #[error("Failed to encode {path}: {message}")]
    Encode { path: PathBuf, message: String },
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(PathBuf),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Outcome of an in-place rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Written {
    /// Size of the file before it was replaced.
    pub original_bytes: u64,
    /// Size of the newly written file.
    pub bytes: u64,
}

/// Trait for image processing backends.
///
/// Every backend must implement all four operations so the rest of the
/// codebase is backend-agnostic. `Sync` is required because the batch driver
/// shares one backend across rayon workers.
pub trait ImageBackend: Sync {
    /// Read image dimensions without decoding pixel data.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Crop, resize to exact dimensions (Lanczos3), and rewrite.
    fn crop_resize(&self, params: &CropResizeParams) -> Result<Written, BackendError>;

    /// Modulate and gamma-correct, then rewrite.
    fn adjust(&self, params: &AdjustParams) -> Result<Written, BackendError>;

    /// Re-encode with new encoder settings.
    fn reencode(&self, params: &ReencodeParams) -> Result<Written, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::calculations::CropRect;
    use crate::imaging::params::{EncodeSettings, Modulation};
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Mock backend that records operations without executing them.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    #[derive(Default)]
    pub struct MockBackend {
        pub identify_results: Mutex<Vec<Dimensions>>,
        /// File names (not full paths) whose operations fail with a decode error.
        pub failing: HashSet<String>,
        /// Byte count reported for every rewrite.
        pub written_bytes: u64,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Identify(String),
        CropResize {
            path: String,
            crop: CropRect,
            width: u32,
            height: u32,
            png_level: u8,
        },
        Adjust {
            path: String,
            modulation: Modulation,
            gamma: f32,
        },
        Reencode {
            path: String,
            png_level: u8,
            jpeg_quality: u8,
        },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        /// Dimensions are popped from the end, one per identify call.
        pub fn with_dimensions(dims: Vec<Dimensions>) -> Self {
            Self {
                identify_results: Mutex::new(dims),
                ..Self::default()
            }
        }

        pub fn failing_on(mut self, names: &[&str]) -> Self {
            self.failing = names.iter().map(|n| n.to_string()).collect();
            self
        }

        pub fn writing(mut self, bytes: u64) -> Self {
            self.written_bytes = bytes;
            self
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        fn check(&self, path: &Path) -> Result<(), BackendError> {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if self.failing.contains(&name) {
                return Err(BackendError::Decode {
                    path: path.to_path_buf(),
                    message: "mock failure".into(),
                });
            }
            Ok(())
        }

        fn written(&self, path: &Path) -> Written {
            Written {
                original_bytes: std::fs::metadata(path).map(|m| m.len()).unwrap_or(0),
                bytes: self.written_bytes,
            }
        }

        fn levels(encode: &EncodeSettings) -> (u8, u8) {
            (encode.png.compression_level, encode.jpeg.value())
        }
    }

    impl ImageBackend for MockBackend {
        fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Identify(path.to_string_lossy().to_string()));
            self.check(path)?;

            self.identify_results
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| BackendError::Decode {
                    path: path.to_path_buf(),
                    message: "No mock dimensions".to_string(),
                })
        }

        fn crop_resize(&self, params: &CropResizeParams) -> Result<Written, BackendError> {
            self.check(&params.path)?;
            self.operations.lock().unwrap().push(RecordedOp::CropResize {
                path: params.path.to_string_lossy().to_string(),
                crop: params.crop,
                width: params.width,
                height: params.height,
                png_level: params.encode.png.compression_level,
            });
            Ok(self.written(&params.path))
        }

        fn adjust(&self, params: &AdjustParams) -> Result<Written, BackendError> {
            self.check(&params.path)?;
            self.operations.lock().unwrap().push(RecordedOp::Adjust {
                path: params.path.to_string_lossy().to_string(),
                modulation: params.modulation,
                gamma: params.gamma,
            });
            Ok(self.written(&params.path))
        }

        fn reencode(&self, params: &ReencodeParams) -> Result<Written, BackendError> {
            self.check(&params.path)?;
            let (png_level, jpeg_quality) = Self::levels(&params.encode);
            self.operations.lock().unwrap().push(RecordedOp::Reencode {
                path: params.path.to_string_lossy().to_string(),
                png_level,
                jpeg_quality,
            });
            Ok(self.written(&params.path))
        }
    }

    #[test]
    fn mock_records_identify() {
        let backend = MockBackend::with_dimensions(vec![Dimensions {
            width: 800,
            height: 600,
        }]);

        let result = backend.identify(Path::new("/test/image.png")).unwrap();
        assert_eq!(result.width, 800);
        assert_eq!(result.height, 600);

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], RecordedOp::Identify(p) if p == "/test/image.png"));
    }

    #[test]
    fn mock_identify_without_dimensions_errors() {
        let backend = MockBackend::new();
        assert!(backend.identify(Path::new("/a.png")).is_err());
    }

    #[test]
    fn mock_fails_on_named_files() {
        let backend = MockBackend::new().failing_on(&["bad.png"]);
        let result = backend.reencode(&ReencodeParams {
            path: "/dir/bad.png".into(),
            encode: EncodeSettings::default(),
        });
        assert!(matches!(result, Err(BackendError::Decode { .. })));
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn mock_records_crop_resize() {
        let backend = MockBackend::new().writing(42);
        let written = backend
            .crop_resize(&CropResizeParams {
                path: "/nonexistent/a.png".into(),
                crop: CropRect {
                    left: 1,
                    top: 2,
                    width: 3,
                    height: 4,
                },
                width: 2800,
                height: 1800,
                encode: EncodeSettings::default(),
            })
            .unwrap();

        assert_eq!(written.bytes, 42);
        assert_eq!(written.original_bytes, 0);
        let ops = backend.get_operations();
        assert!(matches!(
            &ops[0],
            RecordedOp::CropResize {
                width: 2800,
                height: 1800,
                png_level: 1,
                ..
            }
        ));
    }
}
