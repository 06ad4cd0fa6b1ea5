use crate::url::domain::{extract_domain, is_same_or_subdomain};
use url::Url;

/// Decides which references belong to the mirror
///
/// Two checks apply to every reference: it must live on the seed host or one
/// of its subdomains, and it must not end with a rejected suffix. Pages are
/// additionally checked against the excluded path prefixes once their mapped
/// path is known.
#[derive(Debug, Clone)]
pub struct ScopeFilter {
    seed_host: String,
    reject: Vec<String>,
    exclude: Vec<String>,
}

impl ScopeFilter {
    /// Creates a filter scoped to the host of `seed`
    ///
    /// Reject suffixes are compared case-insensitively. Exclude prefixes are
    /// compared in `/`-rooted form, so `private`, `./private` and `/private`
    /// are equivalent.
    pub fn new(seed: &Url, reject: &[String], exclude: &[String]) -> Self {
        Self {
            seed_host: extract_domain(seed).unwrap_or_default(),
            reject: reject
                .iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            exclude: exclude
                .iter()
                .map(|p| rooted(p.trim()))
                .filter(|p| p != "/")
                .collect(),
        }
    }

    /// The host the mirror is scoped to
    pub fn seed_host(&self) -> &str {
        &self.seed_host
    }

    /// True if the URL lives on the seed host or one of its subdomains
    pub fn in_domain(&self, url: &Url) -> bool {
        match extract_domain(url) {
            Some(host) => is_same_or_subdomain(&self.seed_host, &host),
            None => false,
        }
    }

    /// True if the URL (or its path) ends with a rejected suffix
    pub fn is_rejected(&self, url: &Url) -> bool {
        let full = url.as_str().to_lowercase();
        let path = url.path().to_lowercase();

        self.reject
            .iter()
            .any(|suffix| full.ends_with(suffix.as_str()) || path.ends_with(suffix.as_str()))
    }

    /// True if the reference may be followed or downloaded
    pub fn allows(&self, url: &Url) -> bool {
        self.in_domain(url) && !self.is_rejected(url)
    }

    /// True if a page's mapped relative path falls under an excluded prefix
    pub fn is_excluded_path(&self, relative_path: &str) -> bool {
        let path = rooted(relative_path);
        self.exclude.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }
}

/// Rewrites `./a/b`, `a/b` and `/a/b` to `/a/b`
fn rooted(path: &str) -> String {
    let trimmed = path.trim_start_matches("./").trim_start_matches('/');
    format!("/{}", trimmed)
}
