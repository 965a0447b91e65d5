//! Image file discovery.
//!
//! Collects the files a batch job will rewrite. Two modes:
//!
//! - **Flat**: only the direct children of the directory (crop, brighten,
//!   fix-colors operate on a single folder of case images).
//! - **Recursive**: the whole tree, via [walkdir](https://docs.rs/walkdir)
//!   (compress walks every subfolder of the site's image root).
//!
//! A file is selected when it is a regular file, its extension is in the
//! allowed set (case-insensitive), and its file name is not in the skip
//! list. The result is sorted by path so runs are reproducible.
//!
//! A missing directory is a fatal error: the batch cannot start.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {0}")]
    DirNotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Which files to pick up.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub recursive: bool,
    /// Lowercase extensions without the dot.
    pub extensions: Vec<String>,
    /// Exact file names to leave out.
    pub skip_files: Vec<String>,
}

impl ScanOptions {
    pub fn flat(extensions: &[String]) -> Self {
        Self {
            recursive: false,
            extensions: extensions.iter().map(|e| e.to_ascii_lowercase()).collect(),
            skip_files: Vec::new(),
        }
    }

    pub fn recursive(extensions: &[String]) -> Self {
        Self {
            recursive: true,
            ..Self::flat(extensions)
        }
    }

    pub fn skipping(mut self, names: &[String]) -> Self {
        self.skip_files = names.to_vec();
        self
    }

    fn accepts(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if self.skip_files.iter().any(|s| s == name) {
            return false;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|allowed| *allowed == ext)
            })
    }
}

/// Find the image files under `dir` that `options` selects.
pub fn find_images(dir: &Path, options: &ScanOptions) -> Result<Vec<PathBuf>, ScanError> {
    if !dir.is_dir() {
        return Err(ScanError::DirNotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    if options.recursive {
        for entry in WalkDir::new(dir).follow_links(false) {
            let entry = entry?;
            if entry.file_type().is_file() && options.accepts(entry.path()) {
                files.push(entry.into_path());
            }
        }
    } else {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() && options.accepts(&entry.path()) {
                files.push(entry.path());
            }
        }
    }

    files.sort();
    tracing::debug!(dir = %dir.display(), count = files.len(), "scanned");
    Ok(files)
}
