//! CLI output formatting for batch jobs.
//!
//! # Output Format
//!
//! ## Progress
//!
//! One line per file, prefixed with its 1-based position in the batch.
//! Lines arrive in completion order, so the index is what ties a line back
//! to the input list.
//!
//! ```text
//! crop: 3 files
//!     001 hero.png: 4000x2000 → crop 3111x2000 at 445,0 → 2800x1800 (1.2 MB → 980.4 KB)
//!     003 same.png: 2800x1800 already at target (1.1 MB → 1.1 MB)
//!     002 broken.png: FAILED Failed to decode broken.png: ...
//! ```
//!
//! ## Summary
//!
//! ```text
//! compress: 11 of 12 files done, 1 failed
//!     Failed: pics/broken.png
//!         Failed to decode pics/broken.png: ...
//! Total: 14.2 MB → 11.9 MB (16.2% saved)
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::imaging::CropOutcome;
use crate::process::{BatchReport, FileOutcome, ProcessEvent};
use std::path::Path;

/// Format a 0-based batch index as a 3-digit, 1-based position.
fn format_index(index: usize) -> String {
    format!("{:0>3}", index + 1)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Human-readable byte count (binary units, one decimal above bytes).
fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

fn size_change(before: u64, after: u64) -> String {
    format!("{} \u{2192} {}", format_bytes(before), format_bytes(after))
}

fn crop_detail(outcome: &CropOutcome) -> String {
    let source = format!("{}x{}", outcome.source.width, outcome.source.height);
    let plan = &outcome.plan;
    if plan.is_noop {
        return format!("{} already at target", source);
    }
    let crop = &plan.crop;
    if crop.is_full(outcome.source) {
        format!("{} \u{2192} {}x{}", source, plan.width, plan.height)
    } else {
        format!(
            "{} \u{2192} crop {}x{} at {},{} \u{2192} {}x{}",
            source, crop.width, crop.height, crop.left, crop.top, plan.width, plan.height
        )
    }
}

fn outcome_detail(outcome: &FileOutcome) -> String {
    match outcome {
        FileOutcome::Planned(plan) => format!("{} (dry run)", crop_detail(plan)),
        FileOutcome::Cropped(crop) => match crop.written {
            Some(w) => format!(
                "{} ({})",
                crop_detail(crop),
                size_change(w.original_bytes, w.bytes)
            ),
            None => crop_detail(crop),
        },
        FileOutcome::Adjusted(w) => size_change(w.original_bytes, w.bytes),
        FileOutcome::Compressed(c) => format!(
            "{} ({:.1}% saved)",
            size_change(c.original_bytes, c.new_bytes),
            c.savings_percent
        ),
    }
}

/// Format a single progress event.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::Started { job, total } => {
            let noun = if *total == 1 { "file" } else { "files" };
            vec![format!("{}: {} {}", job, total, noun)]
        }
        ProcessEvent::FileDone {
            index,
            path,
            outcome,
        } => vec![format!(
            "{}{} {}: {}",
            indent(1),
            format_index(*index),
            file_label(path),
            outcome_detail(outcome)
        )],
        ProcessEvent::FileFailed { index, path, error } => vec![format!(
            "{}{} {}: FAILED {}",
            indent(1),
            format_index(*index),
            file_label(path),
            error
        )],
    }
}

/// Format the end-of-run summary.
pub fn format_summary(report: &BatchReport) -> Vec<String> {
    let mut lines = Vec::new();
    let verb = if report.dry_run { "planned" } else { "done" };

    let mut head = format!(
        "{}: {} of {} files {}",
        report.job, report.succeeded, report.total, verb
    );
    if !report.failures.is_empty() {
        head.push_str(&format!(", {} failed", report.failed()));
    }
    lines.push(head);

    for failure in &report.failures {
        lines.push(format!("{}Failed: {}", indent(1), failure.path.display()));
        lines.push(format!("{}{}", indent(2), failure.error));
    }

    if report.original_bytes > 0 || report.new_bytes > 0 {
        lines.push(format!(
            "Total: {} ({:.1}% saved)",
            size_change(report.original_bytes, report.new_bytes),
            report.savings_percent()
        ));
    }

    lines
}

/// Print the end-of-run summary to stdout.
pub fn print_summary(report: &BatchReport) {
    for line in format_summary(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
