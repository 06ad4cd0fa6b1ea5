//! Tests for the single and multi-URL downloader

use std::time::Instant;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wmirror::config::HttpConfig;
use wmirror::crawler::build_http_client;
use wmirror::download::{download_all, download_file, Console, DownloadOptions};
use wmirror::MirrorError;

async fn mount_file(server: &MockServer, route: &str, body: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/octet-stream"))
        .expect(1)
        .mount(server)
        .await;
}

fn options(dir: &tempfile::TempDir) -> DownloadOptions {
    DownloadOptions {
        directory: dir.path().to_path_buf(),
        show_progress: false,
        ..DownloadOptions::default()
    }
}

#[tokio::test]
async fn test_download_named_after_url() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_file(&server, "/files/archive.zip", b"zipdata".to_vec()).await;

    let client = build_http_client(&HttpConfig::default()).unwrap();
    let url = format!("{}/files/archive.zip", server.uri());
    let report = download_file(&client, &url, &options(&dir), &Console::Silent)
        .await
        .expect("Download failed");

    assert_eq!(report.status, 200);
    assert_eq!(report.bytes, 7);
    assert_eq!(report.path, dir.path().join("archive.zip"));
    assert_eq!(std::fs::read(&report.path).unwrap(), b"zipdata");
}

#[tokio::test]
async fn test_download_with_output_name() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_file(&server, "/data", b"payload".to_vec()).await;

    let client = build_http_client(&HttpConfig::default()).unwrap();
    let options = DownloadOptions {
        output_name: Some("saved.bin".to_string()),
        ..options(&dir)
    };
    download_file(&client, &format!("{}/data", server.uri()), &options, &Console::Silent)
        .await
        .unwrap();

    assert_eq!(std::fs::read(dir.path().join("saved.bin")).unwrap(), b"payload");
    assert!(!dir.path().join("data").exists());
}

#[tokio::test]
async fn test_download_not_found_leaves_no_file() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/missing.txt"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_http_client(&HttpConfig::default()).unwrap();
    let url = format!("{}/missing.txt", server.uri());
    let result = download_file(&client, &url, &options(&dir), &Console::Silent).await;

    assert!(matches!(result, Err(MirrorError::Fetch(_))));
    assert!(!dir.path().join("missing.txt").exists());
}

#[tokio::test]
async fn test_download_all_numbers_output_names() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_file(&server, "/one", b"first".to_vec()).await;
    mount_file(&server, "/two", b"second".to_vec()).await;

    let client = build_http_client(&HttpConfig::default()).unwrap();
    let urls = vec![
        format!("{}/one", server.uri()),
        format!("{}/two", server.uri()),
    ];
    let options = DownloadOptions {
        output_name: Some("test_file".to_string()),
        ..options(&dir)
    };

    let reports = download_all(&client, &urls, &options, &Console::Silent)
        .await
        .expect("Downloads failed");

    assert_eq!(reports.len(), 2);
    assert_eq!(std::fs::read(dir.path().join("test_file_0")).unwrap(), b"first");
    assert_eq!(std::fs::read(dir.path().join("test_file_1")).unwrap(), b"second");
}

#[tokio::test]
async fn test_download_all_reports_partial_failure() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_file(&server, "/ok.txt", b"ok".to_vec()).await;

    Mock::given(method("GET"))
        .and(path("/broken.txt"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_http_client(&HttpConfig::default()).unwrap();
    let urls = vec![
        format!("{}/ok.txt", server.uri()),
        format!("{}/broken.txt", server.uri()),
    ];

    let result = download_all(&client, &urls, &options(&dir), &Console::Silent).await;

    assert!(matches!(result, Err(MirrorError::Download(_))));
    // The healthy download still completed
    assert_eq!(std::fs::read(dir.path().join("ok.txt")).unwrap(), b"ok");
    assert!(!dir.path().join("broken.txt").exists());
}

#[tokio::test]
async fn test_rate_limited_download_is_throttled() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_file(&server, "/big.bin", vec![b'x'; 3000]).await;

    let client = build_http_client(&HttpConfig::default()).unwrap();
    let options = DownloadOptions {
        rate_limit: 2000,
        ..options(&dir)
    };

    let start = Instant::now();
    let report = download_file(
        &client,
        &format!("{}/big.bin", server.uri()),
        &options,
        &Console::Silent,
    )
    .await
    .unwrap();

    // 2000 bytes pass at once, the remaining 1000 wait for half a second
    assert_eq!(report.bytes, 3000);
    assert!(
        start.elapsed().as_millis() >= 400,
        "Download took only {:?}",
        start.elapsed()
    );
}
