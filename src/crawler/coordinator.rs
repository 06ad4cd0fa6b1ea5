//! Crawl coordinator - main mirror orchestration logic
//!
//! This module contains the page walk that coordinates all aspects of a
//! mirror run:
//! - Claiming URLs in the visited set before they are fetched
//! - Fetching, classifying and storing pages
//! - Downloading stylesheets, scripts and leaf resources
//! - Rewriting references for offline browsing
//!
//! The walk is an explicit LIFO worklist. Children of a page are pushed in
//! reverse document order, so pages are visited in the same depth-first
//! pre-order a recursive walk would produce.

use crate::crawler::extractor::{DocumentKind, Extractor, Handling, Reference};
use crate::crawler::fetcher::{FetchResponse, Fetcher};
use crate::crawler::job::MirrorJob;
use crate::crawler::rewriter::Rewriter;
use crate::output::MirrorSummary;
use crate::state::{CrawlState, PageState};
use crate::url::{relative_path, PathMapper, ScopeFilter};
use crate::{FetchError, MirrorError};
use std::path::Path;
use std::time::Instant;
use url::Url;

/// Result of processing one claimed page
enum PageOutcome {
    /// Page was stored; these in-scope pages were discovered on it
    Written(Vec<Url>),
    /// Page was deliberately not stored
    Skipped(PageState),
}

/// Main mirror coordinator structure
///
/// Owns the crawl state of exactly one run.
pub struct Coordinator<F> {
    job: MirrorJob,
    fetcher: F,
    extractor: Extractor,
    scope: ScopeFilter,
    mapper: PathMapper,
    state: CrawlState,
    summary: MirrorSummary,
}

impl<F: Fetcher> Coordinator<F> {
    /// Creates a new coordinator instance
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(MirrorError)` - The seed has no host or a pattern failed to compile
    pub fn new(job: MirrorJob, fetcher: F) -> Result<Self, MirrorError> {
        let root = job.mirror_root()?;
        let scope = ScopeFilter::new(&job.seed, &job.reject, &job.exclude);
        let summary = MirrorSummary::new(job.seed.as_str(), root.display().to_string());

        Ok(Self {
            extractor: Extractor::new()?,
            mapper: PathMapper::new(root, scope.seed_host()),
            scope,
            state: CrawlState::new(),
            summary,
            job,
            fetcher,
        })
    }

    /// Runs the page walk from the seed
    ///
    /// A failure to fetch, map or write the seed page aborts the run with
    /// [`MirrorError::SeedFailed`]. Every other failure is logged and the URL
    /// skipped.
    pub async fn run(mut self) -> Result<MirrorSummary, MirrorError> {
        let start_time = Instant::now();
        let seed = self.job.seed.clone();

        tracing::info!(
            "Mirroring {} into {}",
            seed,
            self.mapper.root().display()
        );

        let mut worklist = match self.visit_page(&seed).await {
            Ok(children) => children,
            Err(e) => {
                tracing::error!("Failed to mirror seed {}: {}", seed, e);
                return Err(MirrorError::SeedFailed {
                    url: seed.to_string(),
                    source: Box::new(e),
                });
            }
        };
        worklist.reverse();

        let mut pages_visited = 1u64;

        while let Some(url) = worklist.pop() {
            if self.state.is_visited(&url) {
                continue;
            }

            match self.visit_page(&url).await {
                Ok(children) => worklist.extend(children.into_iter().rev()),
                Err(e) => tracing::warn!("Skipping page {}: {}", url, e),
            }

            pages_visited += 1;
            if pages_visited % 10 == 0 {
                tracing::info!(
                    "Progress: {} pages visited, {} queued, {} files written",
                    pages_visited,
                    worklist.len(),
                    self.summary.files_written()
                );
            }
        }

        self.summary.skipped = self.state.count_where(PageState::is_skipped) as u64;
        self.summary.failed = self.state.count_where(PageState::is_error) as u64;
        self.summary.bytes_written = self.state.bytes_written();
        self.summary.elapsed = start_time.elapsed();

        tracing::info!(
            "Mirror completed: {} pages and {} resources written in {:?}",
            self.summary.pages_written,
            self.summary.resources_written,
            self.summary.elapsed
        );

        Ok(self.summary)
    }

    /// Claims and processes one page, recording its final state
    async fn visit_page(&mut self, url: &Url) -> Result<Vec<Url>, MirrorError> {
        if !self.state.mark_visited(url) {
            return Ok(Vec::new());
        }

        match self.process_page(url).await {
            Ok(PageOutcome::Written(children)) => {
                self.state.set_state(url, PageState::Written);
                self.summary.pages_written += 1;
                Ok(children)
            }
            Ok(PageOutcome::Skipped(state)) => {
                tracing::debug!("Skipped page {}: {}", url, state);
                self.state.set_state(url, state);
                Ok(Vec::new())
            }
            Err(e) => {
                self.record_failure(url, &e);
                Err(e)
            }
        }
    }

    /// Fetches, stores and scans a page
    ///
    /// 1. Skip pages under an excluded path without fetching them
    /// 2. Fetch; non-2xx is an error, non-HTML is a silent skip
    /// 3. Extract references, rewrite them if enabled, write the page
    /// 4. Download stylesheets, scripts and leaf resources in document order
    /// 5. Return the in-scope pages found on the page
    async fn process_page(&mut self, url: &Url) -> Result<PageOutcome, MirrorError> {
        if self.scope.is_excluded_path(&relative_path(url)?) {
            return Ok(PageOutcome::Skipped(PageState::Excluded));
        }

        self.state.set_state(url, PageState::Fetching);
        let response = self.fetch_checked(url).await?;

        if !response.is_html() {
            tracing::debug!(
                "Not HTML ({}): {}",
                response.content_type.as_deref().unwrap_or("no content type"),
                url
            );
            return Ok(PageOutcome::Skipped(PageState::ContentMismatch));
        }

        let path = self.mapper.local_path(url)?;
        let references = self.store_document(url, &path, DocumentKind::Html, &response).await?;
        tracing::info!("Saved page {} -> {}", url, path.display());

        let mut children = Vec::new();
        for reference in &references {
            let target = &reference.resolved;
            if !self.scope.allows(target) {
                tracing::debug!("Out of scope: {}", target);
                continue;
            }

            match reference.handling() {
                Handling::Page => children.push(target.clone()),
                Handling::Stylesheet => self.download_document(target, DocumentKind::Css).await,
                Handling::Script => self.download_document(target, DocumentKind::Js).await,
                Handling::Leaf => self.download_file(target).await,
                Handling::Ignore => {}
            }
        }

        Ok(PageOutcome::Written(children))
    }

    /// Downloads a stylesheet or script, rewrites it and fetches its images
    async fn download_document(&mut self, url: &Url, kind: DocumentKind) {
        if !self.state.mark_visited(url) {
            return;
        }

        let images = match self.process_document(url, kind).await {
            Ok(images) => {
                self.record_resource(url);
                images
            }
            Err(e) => {
                tracing::warn!("Failed to download {}: {}", url, e);
                self.record_failure(url, &e);
                return;
            }
        };

        for image in &images {
            self.download_file(image).await;
        }
    }

    async fn process_document(
        &mut self,
        url: &Url,
        kind: DocumentKind,
    ) -> Result<Vec<Url>, MirrorError> {
        self.state.set_state(url, PageState::Fetching);
        let response = self.fetch_checked(url).await?;
        let path = self.mapper.local_path(url)?;
        let references = self.store_document(url, &path, kind, &response).await?;
        tracing::info!("Saved {} -> {}", url, path.display());

        Ok(references
            .into_iter()
            .filter(|r| r.handling() == Handling::Leaf && self.scope.allows(&r.resolved))
            .map(|r| r.resolved)
            .collect())
    }

    /// Downloads a leaf resource as is
    async fn download_file(&mut self, url: &Url) {
        if !self.state.mark_visited(url) {
            return;
        }

        match self.process_file(url).await {
            Ok(()) => self.record_resource(url),
            Err(e) => {
                tracing::warn!("Failed to download {}: {}", url, e);
                self.record_failure(url, &e);
            }
        }
    }

    async fn process_file(&mut self, url: &Url) -> Result<(), MirrorError> {
        self.state.set_state(url, PageState::Fetching);
        let response = self.fetch_checked(url).await?;
        let path = self.mapper.local_path(url)?;
        self.write_file(&path, &response.body).await?;
        tracing::info!("Saved {} -> {}", url, path.display());
        Ok(())
    }

    /// Extracts references from a fetched document and writes its saved form
    ///
    /// The body is scanned and rewritten as raw bytes, so everything outside
    /// the replaced references is saved exactly as fetched. With link
    /// conversion disabled the fetched bytes are written unchanged.
    async fn store_document(
        &mut self,
        url: &Url,
        path: &Path,
        kind: DocumentKind,
        response: &FetchResponse,
    ) -> Result<Vec<Reference>, MirrorError> {
        let references = self
            .extractor
            .extract(kind, &response.body, &response.final_url);
        tracing::debug!("Found {} references in {}", references.len(), url);

        if self.job.convert_links {
            let rewritten =
                Rewriter::new(&self.mapper, &self.scope).rewrite(&response.body, url, &references);
            self.write_file(path, &rewritten).await?;
        } else {
            self.write_file(path, &response.body).await?;
        }

        Ok(references)
    }

    /// Fetches `url`, turning a non-2xx status into an error
    async fn fetch_checked(&self, url: &Url) -> Result<FetchResponse, MirrorError> {
        let response = self.fetcher.fetch(url).await?;
        if !response.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status,
            }
            .into());
        }
        Ok(response)
    }

    /// Writes a file under the mirror root, creating parent directories
    async fn write_file(&mut self, path: &Path, contents: &[u8]) -> Result<(), MirrorError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| MirrorError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        tokio::fs::write(path, contents)
            .await
            .map_err(|source| MirrorError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        self.state.add_bytes(contents.len() as u64);
        Ok(())
    }

    fn record_resource(&mut self, url: &Url) {
        self.state.set_state(url, PageState::Written);
        self.summary.resources_written += 1;
    }

    fn record_failure(&mut self, url: &Url, error: &MirrorError) {
        self.state.set_state(url, failure_state(error));
    }
}

/// Terminal state recorded for a URL that failed with `error`
fn failure_state(error: &MirrorError) -> PageState {
    match error {
        MirrorError::Fetch(FetchError::Status { .. }) => PageState::BadStatus,
        MirrorError::Fetch(FetchError::Timeout { .. } | FetchError::Connect { .. }) => {
            PageState::Unreachable
        }
        _ => PageState::Failed,
    }
}
