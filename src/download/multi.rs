//! Concurrent download of a list of URLs

use crate::download::file::{download_file, DownloadOptions, DownloadReport};
use crate::download::progress::Console;
use crate::MirrorError;
use reqwest::Client;
use std::path::Path;
use tokio::task::JoinSet;

/// Reads the URLs listed in a file, one per line
///
/// Lines are trimmed; blank lines are skipped.
pub async fn read_urls_from_file(path: &Path) -> Result<Vec<String>, MirrorError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| MirrorError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Downloads every URL concurrently, one task per URL
///
/// Each task gets its own rate limiter. When an output name is given, the
/// file of the i-th URL is saved as `<name>_<i>`. Progress bars are not drawn
/// since the transfers interleave.
///
/// Failures are reported on `console` and do not stop the other downloads;
/// if any download failed the call returns an error counting them.
pub async fn download_all(
    client: &Client,
    urls: &[String],
    options: &DownloadOptions,
    console: &Console,
) -> Result<Vec<DownloadReport>, MirrorError> {
    let mut tasks = JoinSet::new();

    for (i, url) in urls.iter().enumerate() {
        let client = client.clone();
        let console = console.clone();
        let url = url.clone();
        let options = DownloadOptions {
            output_name: options
                .output_name
                .as_ref()
                .map(|name| format!("{}_{}", name, i)),
            show_progress: false,
            ..options.clone()
        };

        tasks.spawn(async move {
            let result = download_file(&client, &url, &options, &console).await;
            (url, result)
        });
    }

    let mut reports = Vec::with_capacity(urls.len());
    let mut failed = 0usize;

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((_, Ok(report))) => reports.push(report),
            Ok((url, Err(e))) => {
                failed += 1;
                tracing::warn!("Download of {} failed: {}", url, e);
                console.line(format!("Error downloading {}: {}", url, e));
            }
            Err(e) => {
                failed += 1;
                tracing::error!("Download task failed: {}", e);
            }
        }
    }

    console.line(format!(
        "Download finished: {} of {} files",
        reports.len(),
        urls.len()
    ));

    if failed > 0 {
        return Err(MirrorError::Download(format!(
            "{} of {} downloads failed",
            failed,
            urls.len()
        )));
    }

    Ok(reports)
}
