use crate::state::PageState;
use std::collections::HashMap;
use url::Url;

/// Per-run bookkeeping for a mirror
///
/// The visited set is shared by pages and resources: a URL is claimed exactly
/// once, before its fetch, so a URL reachable along many paths is fetched at
/// most once per run.
#[derive(Debug, Default)]
pub struct CrawlState {
    pages: HashMap<String, PageState>,
    bytes_written: u64,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `url` for fetching
    ///
    /// Returns true if the URL was not seen before in this run, false if it was
    /// already claimed (and must not be fetched again).
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        let key = url.as_str();
        if self.pages.contains_key(key) {
            return false;
        }
        self.pages.insert(key.to_string(), PageState::Claimed);
        true
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.pages.contains_key(url.as_str())
    }

    /// Records a new state for an already claimed URL
    pub fn set_state(&mut self, url: &Url, state: PageState) {
        if let Some(current) = self.pages.get_mut(url.as_str()) {
            *current = state;
        }
    }

    pub fn add_bytes(&mut self, n: u64) {
        self.bytes_written += n;
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Number of URLs whose current state satisfies `pred`
    pub fn count_where(&self, pred: impl Fn(&PageState) -> bool) -> usize {
        self.pages.values().filter(|s| pred(s)).count()
    }
}
