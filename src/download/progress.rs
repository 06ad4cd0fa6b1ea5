//! Console output for downloads
//!
//! The downloader prints wget-style status lines and draws an `indicatif`
//! progress bar. In background mode the lines go to a log file and no bar is
//! drawn.

use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::Write;
use std::sync::{Arc, Mutex};

const BAR_TEMPLATE: &str =
    "{bytes} / {total_bytes} [{bar:50.cyan/blue}] {percent}% {bytes_per_sec} {elapsed}";
const SPINNER_TEMPLATE: &str = "{spinner:.green} {bytes} {bytes_per_sec} {elapsed}";

/// Destination of the downloader's status lines
#[derive(Debug, Clone)]
pub enum Console {
    /// Print to standard output
    Stdout,
    /// Append to a shared log file (background mode)
    Log(Arc<Mutex<File>>),
    /// Discard everything
    Silent,
}

impl Console {
    pub fn log_file(file: File) -> Self {
        Self::Log(Arc::new(Mutex::new(file)))
    }

    /// Writes one status line
    pub fn line(&self, message: impl AsRef<str>) {
        match self {
            Self::Stdout => println!("{}", message.as_ref()),
            Self::Log(file) => {
                if let Ok(mut file) = file.lock() {
                    if let Err(e) = writeln!(file, "{}", message.as_ref()) {
                        tracing::debug!("Failed to write log line: {}", e);
                    }
                }
            }
            Self::Silent => {}
        }
    }
}

/// Creates the progress bar for one transfer
///
/// A bar with byte counts, percentage, throughput and elapsed time when the
/// length is known, a spinner otherwise. Hidden when `visible` is false.
pub fn download_bar(total: Option<u64>, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    match total {
        Some(len) => {
            let bar = ProgressBar::new(len);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template(BAR_TEMPLATE)
                    .map(|style| style.progress_chars("=> "))
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        }
        None => {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::default_spinner()
                    .template(SPINNER_TEMPLATE)
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner
        }
    }
}
