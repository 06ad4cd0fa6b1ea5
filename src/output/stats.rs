//! Statistics collected during a mirror run
//!
//! This module provides the summary returned by the crawl driver and its
//! console rendering.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Mirror run summary
#[derive(Debug, Clone)]
pub struct MirrorSummary {
    /// Seed URL of the run
    pub seed: String,

    /// Directory the mirror was written to
    pub root: String,

    /// Number of pages written
    pub pages_written: u64,

    /// Number of stylesheets, scripts and leaf files written
    pub resources_written: u64,

    /// URLs fetched but not stored (wrong content type, excluded path)
    pub skipped: u64,

    /// URLs that failed (network error, bad status, unmappable path, I/O)
    pub failed: u64,

    /// Total bytes written to disk
    pub bytes_written: u64,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl MirrorSummary {
    pub fn new(seed: impl Into<String>, root: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            root: root.into(),
            pages_written: 0,
            resources_written: 0,
            skipped: 0,
            failed: 0,
            bytes_written: 0,
            started_at: Utc::now(),
            elapsed: Duration::ZERO,
        }
    }

    /// Number of files written
    pub fn files_written(&self) -> u64 {
        self.pages_written + self.resources_written
    }
}

/// Formats a byte count the way the downloader reports sizes (`~1.50MB`)
pub fn human_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let b = bytes as f64;
    if b >= GB {
        format!("~{:.2}GB", b / GB)
    } else if b >= MB {
        format!("~{:.2}MB", b / MB)
    } else if b >= KB {
        format!("~{:.2}KB", b / KB)
    } else {
        format!("{}B", bytes)
    }
}

/// Prints the summary to stdout in a formatted manner
pub fn print_summary(summary: &MirrorSummary) {
    println!("=== Mirror Summary ===\n");

    println!("Overview:");
    println!("  Seed: {}", summary.seed);
    println!("  Mirror root: {}", summary.root);
    println!(
        "  Started at: {}",
        summary.started_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!("  Elapsed: {:.1}s", summary.elapsed.as_secs_f64());
    println!();

    println!("Files:");
    println!("  Pages written: {}", summary.pages_written);
    println!("  Resources written: {}", summary.resources_written);
    println!(
        "  Bytes written: {} ({})",
        summary.bytes_written,
        human_size(summary.bytes_written)
    );
    println!();

    if summary.skipped > 0 || summary.failed > 0 {
        println!("Not stored:");
        println!("  Skipped: {}", summary.skipped);
        println!("  Failed: {}", summary.failed);
        println!();
    }
}
