//! Crawler module for site mirroring
//!
//! This module contains the core mirroring logic, including:
//! - HTTP fetching behind the `Fetcher` trait
//! - Pattern-based reference extraction from HTML, CSS and JS
//! - Rewriting of references to mirrored copies
//! - Overall walk coordination

mod coordinator;
mod extractor;
mod fetcher;
mod job;
mod rewriter;

pub use coordinator::Coordinator;
pub use extractor::{DocumentKind, Extractor, Handling, Reference, Source};
pub use fetcher::{build_http_client, FetchResponse, Fetcher, HttpFetcher};
pub(crate) use fetcher::classify_error;
pub use job::MirrorJob;
pub use rewriter::Rewriter;

use crate::config::HttpConfig;
use crate::output::MirrorSummary;
use crate::MirrorError;

/// Runs a complete mirror operation over HTTP
///
/// This is the main entry point for mirroring a site. It will:
/// 1. Build the HTTP client
/// 2. Walk same-site pages from the seed
/// 3. Download stylesheets, scripts and images
/// 4. Write everything under `<output_dir>/<host>`
///
/// # Example
///
/// ```no_run
/// use wmirror::config::Config;
/// use wmirror::crawler::{mirror, MirrorJob};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::default();
/// let job = MirrorJob::new("https://example.com/", &config.mirror)?;
/// let summary = mirror(job, &config.http).await?;
/// println!("{} files written", summary.files_written());
/// # Ok(())
/// # }
/// ```
pub async fn mirror(job: MirrorJob, http: &HttpConfig) -> Result<MirrorSummary, MirrorError> {
    let fetcher = HttpFetcher::new(http)?;
    Coordinator::new(job, fetcher)?.run().await
}
