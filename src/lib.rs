//! # casepics
//!
//! Batch maintenance for a website's case-study images. Each job takes a
//! folder of PNG/JPEG files and rewrites them in place:
//!
//! ```text
//! crop        cases dir   center-crop to 14:9, Lanczos3 resize to 2800x1800
//! brighten    cases dir   lift brightness
//! fix-colors  cases dir   darken, boost saturation
//! compress    pics dir    re-encode every image in the tree, report savings
//! ```
//!
//! # Architecture
//!
//! ```text
//! config ──► scan::find_images ──► process::run_batch ──► output
//!                                        │
//!                                        ▼
//!                           imaging::operations (per file)
//!                                        │
//!                     calculations ──────┼────── color
//!                                        ▼
//!                              ImageBackend (RustBackend)
//! ```
//!
//! Geometry and color math are pure functions, unit tested without touching
//! the filesystem. Everything that decodes or encodes sits behind
//! [`imaging::ImageBackend`], so the batch driver is tested against a mock.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Crop planning, color math, the backend trait and its `image`-crate implementation |
//! | [`scan`] | Finds the image files a job applies to (flat or recursive) |
//! | [`process`] | Runs one job over many files in parallel, isolating per-file failures |
//! | [`config`] | `casepics.toml` loading, stock defaults, merging and validation |
//! | [`output`] | CLI output formatting for progress events and the run summary |
//! | [`types`] | Shared types (`ImageKind`) |
//!
//! # Design Decisions
//!
//! ## Center Crop Before Resize
//!
//! The crop is computed from the source dimensions alone and always keeps the
//! largest centered rectangle of the target aspect ratio, so the following
//! resize never distorts. See [`imaging::plan_crop`].
//!
//! ## In-Place, Atomic Rewrites
//!
//! Jobs overwrite their inputs. The new encoding goes to a hidden sibling
//! file first and is renamed over the original, so a crash or encode error
//! never leaves a truncated image behind.
//!
//! ## One Bad File Never Stops a Batch
//!
//! Per-file errors are logged with the path and collected in the
//! [`process::BatchReport`]. Only a missing directory or a broken config is
//! fatal.

pub mod config;
pub mod imaging;
pub mod output;
pub mod process;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
