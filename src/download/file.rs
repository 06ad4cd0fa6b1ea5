//! Single-file downloader

use crate::crawler::classify_error;
use crate::download::limiter::RateLimiter;
use crate::download::progress::{download_bar, Console};
use crate::url::normalize_url;
use crate::{FetchError, MirrorError};
use chrono::Local;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use url::Url;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Settings of a download, shared by the single and multi-URL modes
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// File name to save under (`-O`); derived from the URL when unset
    pub output_name: Option<String>,
    /// Directory the file is saved in (`-P`)
    pub directory: PathBuf,
    /// Bytes per second, 0 for unlimited
    pub rate_limit: u64,
    /// Draw a progress bar
    pub show_progress: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            output_name: None,
            directory: PathBuf::from("."),
            rate_limit: 0,
            show_progress: true,
        }
    }
}

/// Outcome of a finished download
#[derive(Debug, Clone)]
pub struct DownloadReport {
    pub url: String,
    pub path: PathBuf,
    pub status: u16,
    pub bytes: u64,
}

/// File name a URL is saved under when no name is given
///
/// The percent-decoded last path segment, or `index.html` when the path ends
/// in `/` or the segment is not a usable file name.
pub fn file_name_for(url: &Url) -> String {
    let segment = url.path().rsplit('/').next().unwrap_or("");
    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_default();

    if decoded.is_empty()
        || decoded == "."
        || decoded == ".."
        || decoded.contains(|c| matches!(c, '/' | '\\' | '\0'))
    {
        "index.html".to_string()
    } else {
        decoded
    }
}

/// Downloads one URL into `options.directory`
///
/// Prints wget-style status lines to `console` and streams the body to disk
/// chunk by chunk through the rate limiter. A non-2xx status is an error and
/// leaves no file behind.
pub async fn download_file(
    client: &Client,
    url: &str,
    options: &DownloadOptions,
    console: &Console,
) -> Result<DownloadReport, MirrorError> {
    console.line(format!("start at {}", Local::now().format(TIMESTAMP_FORMAT)));

    let parsed = normalize_url(url)?;
    let mut response = client
        .get(parsed.clone())
        .send()
        .await
        .map_err(|e| classify_error(&parsed, e))?;

    let status = response.status();
    console.line(format!(
        "sending request, awaiting response... status {}",
        status
    ));
    if !status.is_success() {
        return Err(FetchError::Status {
            url: parsed.to_string(),
            status: status.as_u16(),
        }
        .into());
    }

    let total = response.content_length();
    match total {
        Some(len) => console.line(format!(
            "content size: {} [~{:.2}MB]",
            len,
            len as f64 / 1024.0 / 1024.0
        )),
        None => console.line("content size: unknown"),
    }

    let name = options
        .output_name
        .clone()
        .unwrap_or_else(|| file_name_for(&parsed));
    let path = options.directory.join(name);
    create_parent(&path).await?;
    console.line(format!("saving file to: {}", path.display()));

    let mut file = tokio::fs::File::create(&path)
        .await
        .map_err(|source| io_error(&path, source))?;

    let bar = download_bar(total, options.show_progress);
    let mut limiter = RateLimiter::new(options.rate_limit);
    if !limiter.is_unlimited() {
        console.line(format!(
            "rate limit set to: {:.2} KB/s",
            limiter.rate() as f64 / 1024.0
        ));
    }

    let mut written = 0u64;
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| classify_error(&parsed, e))?
    {
        limiter.acquire(chunk.len() as u64).await;
        file.write_all(&chunk)
            .await
            .map_err(|source| io_error(&path, source))?;
        written += chunk.len() as u64;
        bar.inc(chunk.len() as u64);
    }
    file.flush().await.map_err(|source| io_error(&path, source))?;
    bar.finish();

    tracing::debug!("Wrote {} bytes to {}", written, path.display());
    console.line(format!("Downloaded [{}]", url));
    console.line(format!("finished at {}", Local::now().format(TIMESTAMP_FORMAT)));

    Ok(DownloadReport {
        url: url.to_string(),
        path,
        status: status.as_u16(),
        bytes: written,
    })
}

async fn create_parent(path: &Path) -> Result<(), MirrorError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| io_error(parent, source)),
        _ => Ok(()),
    }
}

fn io_error(path: &Path, source: std::io::Error) -> MirrorError {
    MirrorError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(url: &str) -> String {
        file_name_for(&Url::parse(url).unwrap())
    }

    #[test]
    fn test_file_name_from_last_segment() {
        assert_eq!(name("http://example.com/files/archive.zip"), "archive.zip");
        assert_eq!(name("http://example.com/a/read%20me.txt"), "read me.txt");
        assert_eq!(name("http://example.com/data?id=3"), "data");
    }

    #[test]
    fn test_file_name_defaults_to_index() {
        assert_eq!(name("http://example.com"), "index.html");
        assert_eq!(name("http://example.com/dir/"), "index.html");
        assert_eq!(name("http://example.com/a%2Fb"), "index.html");
    }

    #[test]
    fn test_default_options() {
        let options = DownloadOptions::default();
        assert_eq!(options.directory, PathBuf::from("."));
        assert_eq!(options.rate_limit, 0);
        assert!(options.output_name.is_none());
    }
}
