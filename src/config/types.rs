use serde::Deserialize;

/// Main configuration structure for wmirror
///
/// Every table is optional; a missing table takes its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub mirror: MirrorConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub download: DownloadConfig,
}

/// Site mirroring policy
#[derive(Debug, Clone, Deserialize)]
pub struct MirrorConfig {
    /// URL suffixes that are never fetched (e.g. "pdf", ".zip")
    #[serde(default)]
    pub reject: Vec<String>,

    /// Path prefixes of pages that are never fetched or written (e.g. "/private")
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Rewrite references in saved documents so the mirror browses offline
    #[serde(rename = "convert-links", default)]
    pub convert_links: bool,

    /// Directory under which the `<host>` mirror root is created
    #[serde(rename = "output-dir", default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            reject: Vec::new(),
            exclude: Vec::new(),
            convert_links: false,
            output_dir: default_output_dir(),
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Overall request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Maximum number of redirects followed per request
    #[serde(rename = "max-redirects", default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_redirects: default_max_redirects(),
        }
    }
}

/// Plain downloader configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DownloadConfig {
    /// Speed limit such as "400k" or "2M"; empty or absent means unlimited
    #[serde(rename = "rate-limit", default)]
    pub rate_limit: Option<String>,

    /// Write log output to `wget-log` and hide the progress bar
    #[serde(default)]
    pub background: bool,
}

fn default_output_dir() -> String {
    ".".to_string()
}

fn default_user_agent() -> String {
    format!("wmirror/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_max_redirects() -> usize {
    10
}
