//! Batch driver: run one job over a list of files.
//!
//! ## Jobs
//!
//! | Job | Per-file operation |
//! |---|---|
//! | `crop` | [`crop_to_target`] (or [`plan_crop_for`] on a dry run) |
//! | `brighten`, `fix-colors` | [`adjust_colors`] |
//! | `compress` | [`compress`](crate::imaging::compress) |
//!
//! ## Failure Isolation
//!
//! A file that cannot be read, decoded, planned or written is reported as a
//! [`FileFailure`] and logged with its path; the remaining files are still
//! processed. There are no retries. Only problems that prevent the batch from
//! starting at all (missing directory, invalid config) are fatal, and those
//! are raised before [`run_batch`] is called.
//!
//! ## Parallel Processing
//!
//! Files are processed in parallel using [rayon](https://docs.rs/rayon). Each
//! file is independent; the only shared state is the optional progress
//! channel. Results are reported in input order regardless of which worker
//! finishes first.

use crate::imaging::{
    AdjustConfig, CompressOutcome, CropConfig, CropOutcome, EncodeSettings, ImageBackend,
    OperationError, RustBackend, Written, adjust_colors, compress, crop_to_target, plan_crop_for,
};
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

/// Name of a batch job, as used on the command line and in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobKind {
    Crop,
    Brighten,
    FixColors,
    Compress,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Crop => "crop",
            Self::Brighten => "brighten",
            Self::FixColors => "fix-colors",
            Self::Compress => "compress",
        };
        f.write_str(name)
    }
}

/// A fully configured job.
#[derive(Debug, Clone)]
pub enum Job {
    Crop { config: CropConfig, dry_run: bool },
    Adjust { kind: JobKind, config: AdjustConfig },
    Compress { encode: EncodeSettings },
}

impl Job {
    pub fn kind(&self) -> JobKind {
        match self {
            Self::Crop { .. } => JobKind::Crop,
            Self::Adjust { kind, .. } => *kind,
            Self::Compress { .. } => JobKind::Compress,
        }
    }
}

/// What happened to one file that was processed successfully.
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Cropped(CropOutcome),
    Planned(CropOutcome),
    Adjusted(Written),
    Compressed(CompressOutcome),
}

impl FileOutcome {
    /// `(original, new)` file sizes, when the file was rewritten.
    pub fn sizes(&self) -> Option<(u64, u64)> {
        match self {
            Self::Cropped(CropOutcome {
                written: Some(w), ..
            })
            | Self::Adjusted(w) => Some((w.original_bytes, w.bytes)),
            Self::Compressed(c) => Some((c.original_bytes, c.new_bytes)),
            _ => None,
        }
    }
}

/// Progress events sent while a batch runs.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    Started {
        job: JobKind,
        total: usize,
    },
    FileDone {
        index: usize,
        path: PathBuf,
        outcome: FileOutcome,
    },
    FileFailed {
        index: usize,
        path: PathBuf,
        error: String,
    },
}

/// A file the batch could not process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Summary of a finished batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub job: JobKind,
    pub dry_run: bool,
    pub total: usize,
    pub succeeded: usize,
    pub failures: Vec<FileFailure>,
    /// Sum over rewritten files of their size before the rewrite.
    pub original_bytes: u64,
    /// Sum over rewritten files of their size after the rewrite.
    pub new_bytes: u64,
}

impl BatchReport {
    fn new(job: &Job, total: usize) -> Self {
        Self {
            job: job.kind(),
            dry_run: matches!(job, Job::Crop { dry_run: true, .. }),
            total,
            succeeded: 0,
            failures: Vec::new(),
            original_bytes: 0,
            new_bytes: 0,
        }
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Overall savings in percent, rounded to one decimal.
    pub fn savings_percent(&self) -> f64 {
        crate::imaging::savings_percent(self.original_bytes, self.new_bytes)
    }
}

fn run_one(
    backend: &impl ImageBackend,
    path: &Path,
    job: &Job,
) -> Result<FileOutcome, OperationError> {
    match job {
        Job::Crop {
            config,
            dry_run: true,
        } => plan_crop_for(backend, path, config).map(FileOutcome::Planned),
        Job::Crop { config, .. } => crop_to_target(backend, path, config).map(FileOutcome::Cropped),
        Job::Adjust { config, .. } => adjust_colors(backend, path, config).map(FileOutcome::Adjusted),
        Job::Compress { encode } => compress(backend, path, encode).map(FileOutcome::Compressed),
    }
}

/// Run `job` over `files` with the production backend.
pub fn run(files: &[PathBuf], job: &Job, events: Option<Sender<ProcessEvent>>) -> BatchReport {
    run_batch(&RustBackend::new(), files, job, events)
}

/// Run `job` over `files` using a specific backend (allows testing with mock).
///
/// Never fails as a whole: per-file errors end up in
/// [`BatchReport::failures`].
pub fn run_batch(
    backend: &impl ImageBackend,
    files: &[PathBuf],
    job: &Job,
    events: Option<Sender<ProcessEvent>>,
) -> BatchReport {
    let kind = job.kind();
    let send = |event: ProcessEvent| {
        if let Some(tx) = &events {
            tx.send(event).ok();
        }
    };

    send(ProcessEvent::Started {
        job: kind,
        total: files.len(),
    });
    tracing::info!(job = %kind, files = files.len(), "batch started");

    let results: Vec<Result<FileOutcome, OperationError>> = files
        .par_iter()
        .enumerate()
        .map(|(index, path)| {
            let result = run_one(backend, path, job);
            match &result {
                Ok(outcome) => send(ProcessEvent::FileDone {
                    index,
                    path: path.clone(),
                    outcome: outcome.clone(),
                }),
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "file failed");
                    send(ProcessEvent::FileFailed {
                        index,
                        path: path.clone(),
                        error: e.to_string(),
                    });
                }
            }
            result
        })
        .collect();

    let mut report = BatchReport::new(job, files.len());
    for (path, result) in files.iter().zip(results) {
        match result {
            Ok(outcome) => {
                report.succeeded += 1;
                if let Some((before, after)) = outcome.sizes() {
                    report.original_bytes += before;
                    report.new_bytes += after;
                }
            }
            Err(e) => report.failures.push(FileFailure {
                path: path.clone(),
                error: e.to_string(),
            }),
        }
    }

    tracing::info!(
        job = %kind,
        succeeded = report.succeeded,
        failed = report.failed(),
        "batch finished"
    );
    report
}
