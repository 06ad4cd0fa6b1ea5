//! Plain downloader used outside of mirror mode
//!
//! This module provides:
//! - Single-file downloads with wget-style status lines and a progress bar
//! - Concurrent downloads of a list of URLs
//! - Rate-limit parsing and a token-bucket limiter

mod file;
mod limiter;
mod multi;
mod progress;

pub use file::{download_file, file_name_for, DownloadOptions, DownloadReport};
pub use limiter::{parse_rate_limit, RateLimiter};
pub use multi::{download_all, read_urls_from_file};
pub use progress::{download_bar, Console};
