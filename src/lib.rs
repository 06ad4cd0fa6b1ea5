//! wmirror: a small wget-style downloader and site mirror
//!
//! The core of this crate mirrors a web site into a local directory tree that
//! can be browsed offline: it walks same-site pages from a seed URL, downloads
//! their stylesheets, scripts and images, and rewrites references so that they
//! point at the mirrored copies. The `download` module provides the plain
//! single-file and multi-file downloader used by the command-line tool.

pub mod config;
pub mod crawler;
pub mod download;
pub mod output;
pub mod state;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for wmirror operations
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Path error: {0}")]
    Path(#[from] PathError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Failed to compile extraction pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to mirror seed page {url}: {source}")]
    SeedFailed {
        url: String,
        source: Box<MirrorError>,
    },

    #[error("Download failed: {0}")]
    Download(String),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Errors raised while talking to a remote server
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}")]
    Connect { url: String },

    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: u16 },
}

/// Errors raised when a URL cannot be mapped to a safe location on disk
#[derive(Debug, Error)]
pub enum PathError {
    #[error("URL has no host: {0}")]
    MissingHost(String),

    #[error("Path segment is not a valid file name: {0}")]
    InvalidSegment(String),

    #[error("Failed to parse URL: {0}")]
    Parse(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid rate limit: {0}")]
    InvalidRateLimit(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for wmirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{mirror, Coordinator, MirrorJob};
pub use state::{CrawlState, PageState};
pub use crate::url::{is_same_or_subdomain, normalize_url, PathMapper, ScopeFilter};
