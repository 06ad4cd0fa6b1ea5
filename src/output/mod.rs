//! Output module for reporting mirror results
//!
//! This module handles:
//! - Collecting per-run counters into a `MirrorSummary`
//! - Printing the summary at the end of a run
//! - Formatting byte sizes for the downloader

pub mod stats;

pub use stats::{human_size, print_summary, MirrorSummary};
