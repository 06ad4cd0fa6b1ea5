use crate::config::MirrorConfig;
use crate::url::{mirror_root_name, normalize_url};
use crate::{MirrorError, UrlError};
use std::path::PathBuf;
use url::Url;

/// Immutable description of one mirror run
#[derive(Debug, Clone)]
pub struct MirrorJob {
    /// Normalized seed URL
    pub seed: Url,
    /// URL suffixes that are never fetched
    pub reject: Vec<String>,
    /// Path prefixes of pages that are never fetched or written
    pub exclude: Vec<String>,
    /// Rewrite references in saved documents
    pub convert_links: bool,
    /// Directory under which the mirror root is created
    pub output_dir: PathBuf,
}

impl MirrorJob {
    /// Creates a job for `seed` with the policy from `config`
    pub fn new(seed: &str, config: &MirrorConfig) -> Result<Self, MirrorError> {
        Ok(Self {
            seed: normalize_url(seed)?,
            reject: config.reject.clone(),
            exclude: config.exclude.clone(),
            convert_links: config.convert_links,
            output_dir: PathBuf::from(&config.output_dir),
        })
    }

    /// Directory holding the mirrored tree, `<output_dir>/<host[:port]>`
    pub fn mirror_root(&self) -> Result<PathBuf, MirrorError> {
        let name = mirror_root_name(&self.seed).ok_or(UrlError::MissingDomain)?;
        Ok(self.output_dir.join(name))
    }
}
