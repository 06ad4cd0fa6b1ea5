//! End-to-end tests of the site mirror

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wmirror::config::{HttpConfig, MirrorConfig};
use wmirror::crawler::{mirror, MirrorJob};
use wmirror::url::mirror_root_name;
use wmirror::MirrorError;

/// Mounts a GET handler that must be hit exactly `times` times
async fn mount(server: &MockServer, route: &str, body: &str, mime: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), mime))
        .expect(times)
        .mount(server)
        .await;
}

async fn mount_html(server: &MockServer, route: &str, body: &str) {
    mount(server, route, body, "text/html", 1).await;
}

fn mirror_config(dir: &TempDir) -> MirrorConfig {
    MirrorConfig {
        output_dir: dir.path().display().to_string(),
        ..MirrorConfig::default()
    }
}

/// Directory the mirror of `server` is written to
fn mirror_root(server: &MockServer, dir: &TempDir) -> PathBuf {
    let seed = url::Url::parse(&server.uri()).expect("Failed to parse base URL");
    dir.path()
        .join(mirror_root_name(&seed).expect("Failed to extract host"))
}

fn read(root: &Path, relative: &str) -> String {
    std::fs::read_to_string(root.join(relative))
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", relative, e))
}

#[tokio::test]
async fn test_full_mirror_single_site() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_html(
        &server,
        "/",
        r#"<html><head><link rel="stylesheet" href="/style.css"></head><body>
        <a href="/about">About</a>
        <img src="/logo.png">
        <a href="http://other.invalid/x">Elsewhere</a>
        </body></html>"#,
    )
    .await;
    mount_html(&server, "/about", "<html><body>About us</body></html>").await;
    mount(&server, "/logo.png", "PNGDATA", "image/png", 1).await;
    mount(&server, "/style.css", "body { color: red }", "text/css", 1).await;

    let job = MirrorJob::new(&format!("{}/", server.uri()), &mirror_config(&dir)).unwrap();
    let summary = mirror(job, &HttpConfig::default())
        .await
        .expect("Mirror failed");

    let root = mirror_root(&server, &dir);
    assert!(root.join("index.html").is_file());
    assert!(root.join("about.html").is_file());
    assert_eq!(read(&root, "logo.png"), "PNGDATA");
    assert_eq!(read(&root, "style.css"), "body { color: red }");

    assert_eq!(summary.pages_written, 2);
    assert_eq!(summary.resources_written, 2);
    // The external link was never fetched, so nothing failed
    assert_eq!(summary.failed, 0);
    assert!(!dir.path().join("other.invalid").exists());
}

#[tokio::test]
async fn test_seed_not_found_is_fatal() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let job = MirrorJob::new(&format!("{}/", server.uri()), &mirror_config(&dir)).unwrap();
    let result = mirror(job, &HttpConfig::default()).await;

    assert!(matches!(result, Err(MirrorError::SeedFailed { .. })));
    assert!(!mirror_root(&server, &dir).exists());
}

#[tokio::test]
async fn test_cycle_terminates() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_html(&server, "/", r#"<a href="/a">A</a>"#).await;
    mount_html(&server, "/a", r#"<a href="/b">B</a><a href="/">home</a>"#).await;
    mount_html(&server, "/b", r#"<a href="/a">A</a><a href="/b">self</a>"#).await;

    let job = MirrorJob::new(&format!("{}/", server.uri()), &mirror_config(&dir)).unwrap();
    let summary = mirror(job, &HttpConfig::default()).await.unwrap();

    let root = mirror_root(&server, &dir);
    assert!(root.join("a.html").is_file());
    assert!(root.join("b.html").is_file());
    assert_eq!(summary.pages_written, 3);
}

#[tokio::test]
async fn test_shared_resources_fetched_once() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_html(
        &server,
        "/",
        r#"<img src="/logo.png"><a href="/one">1</a><a href="/two">2</a>"#,
    )
    .await;
    mount_html(&server, "/one", r#"<img src="/logo.png"><a href="/two">2</a>"#).await;
    mount_html(&server, "/two", r#"<img src="logo.png"><a href="/one">1</a>"#).await;
    mount(&server, "/logo.png", "PNG", "image/png", 1).await;

    let job = MirrorJob::new(&format!("{}/", server.uri()), &mirror_config(&dir)).unwrap();
    let summary = mirror(job, &HttpConfig::default()).await.unwrap();

    assert_eq!(summary.pages_written, 3);
    assert_eq!(summary.resources_written, 1);
}

#[tokio::test]
async fn test_rejected_suffix_never_fetched() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_html(
        &server,
        "/",
        r#"<link rel="alternate" href="/manual.pdf"><img src="/scan.PDF"><img src="/ok.png">"#,
    )
    .await;
    mount(&server, "/manual.pdf", "%PDF", "application/pdf", 0).await;
    mount(&server, "/scan.PDF", "%PDF", "application/pdf", 0).await;
    mount(&server, "/ok.png", "PNG", "image/png", 1).await;

    let config = MirrorConfig {
        reject: vec!["pdf".to_string()],
        ..mirror_config(&dir)
    };
    let job = MirrorJob::new(&format!("{}/", server.uri()), &config).unwrap();
    mirror(job, &HttpConfig::default()).await.unwrap();

    let root = mirror_root(&server, &dir);
    assert!(!root.join("manual.pdf").exists());
    assert!(root.join("ok.png").is_file());
}

#[tokio::test]
async fn test_excluded_paths_skipped() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_html(
        &server,
        "/",
        r#"<a href="/private/secret">s</a><a href="/public/page">p</a>"#,
    )
    .await;
    mount(&server, "/private/secret", "secret", "text/html", 0).await;
    mount_html(&server, "/public/page", "public").await;

    let config = MirrorConfig {
        exclude: vec!["/private".to_string()],
        ..mirror_config(&dir)
    };
    let job = MirrorJob::new(&format!("{}/", server.uri()), &config).unwrap();
    let summary = mirror(job, &HttpConfig::default()).await.unwrap();

    let root = mirror_root(&server, &dir);
    assert!(!root.join("private").exists());
    assert!(root.join("public/page.html").is_file());
    assert_eq!(summary.skipped, 1);
}

#[tokio::test]
async fn test_convert_links_rewrites_to_local_paths() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_html(
        &server,
        "/",
        r#"<a href="/x/">X</a><a href="http://other.invalid/y">ext</a>"#,
    )
    .await;
    mount_html(
        &server,
        "/x/",
        r#"<img src="/a/b.png"><a href="/#top">home</a>"#,
    )
    .await;
    mount(&server, "/a/b.png", "PNG", "image/png", 1).await;

    let config = MirrorConfig {
        convert_links: true,
        ..mirror_config(&dir)
    };
    let job = MirrorJob::new(&format!("{}/", server.uri()), &config).unwrap();
    mirror(job, &HttpConfig::default()).await.unwrap();

    let root = mirror_root(&server, &dir);
    assert_eq!(
        read(&root, "index.html"),
        r#"<a href="./x/index.html">X</a><a href="http://other.invalid/y">ext</a>"#
    );
    assert_eq!(
        read(&root, "x/index.html"),
        r#"<img src="../a/b.png"><a href="../index.html#top">home</a>"#
    );
    assert!(root.join("a/b.png").is_file());
}

#[tokio::test]
async fn test_stylesheet_and_script_images_downloaded() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_html(
        &server,
        "/",
        r#"<link rel="stylesheet" href="/css/site.css"><script src="/js/app.js"></script>
        <style>p { background: url('/images/inline.gif') }</style>"#,
    )
    .await;
    mount(
        &server,
        "/css/site.css",
        r#"body { background: url("/images/bg.png") }"#,
        "text/css",
        1,
    )
    .await;
    mount(
        &server,
        "/js/app.js",
        r#"var icon = "/img/icon.svg"; var mode = "dark";"#,
        "application/javascript",
        1,
    )
    .await;
    mount(&server, "/images/bg.png", "BG", "image/png", 1).await;
    mount(&server, "/img/icon.svg", "<svg/>", "image/svg+xml", 1).await;
    mount(&server, "/images/inline.gif", "GIF", "image/gif", 1).await;

    let config = MirrorConfig {
        convert_links: true,
        ..mirror_config(&dir)
    };
    let job = MirrorJob::new(&format!("{}/", server.uri()), &config).unwrap();
    let summary = mirror(job, &HttpConfig::default()).await.unwrap();

    let root = mirror_root(&server, &dir);
    assert_eq!(
        read(&root, "css/site.css"),
        r#"body { background: url("../images/bg.png") }"#
    );
    assert_eq!(
        read(&root, "js/app.js"),
        r#"var icon = "../img/icon.svg"; var mode = "dark";"#
    );
    assert!(root.join("images/bg.png").is_file());
    assert!(root.join("img/icon.svg").is_file());
    assert!(root.join("images/inline.gif").is_file());
    assert_eq!(summary.resources_written, 5);
}

#[tokio::test]
async fn test_without_conversion_saves_fetched_text() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let page = r#"<a href="/about">About</a><img src="/logo.png">"#;
    mount_html(&server, "/", page).await;
    mount_html(&server, "/about", "about").await;
    mount(&server, "/logo.png", "PNG", "image/png", 1).await;

    let job = MirrorJob::new(&format!("{}/", server.uri()), &mirror_config(&dir)).unwrap();
    mirror(job, &HttpConfig::default()).await.unwrap();

    assert_eq!(read(&mirror_root(&server, &dir), "index.html"), page);
}

#[tokio::test]
async fn test_non_html_page_not_stored() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_html(&server, "/", r#"<a href="/feed">feed</a>"#).await;
    mount(&server, "/feed", "{}", "application/json", 1).await;

    let job = MirrorJob::new(&format!("{}/", server.uri()), &mirror_config(&dir)).unwrap();
    let summary = mirror(job, &HttpConfig::default()).await.unwrap();

    assert!(!mirror_root(&server, &dir).join("feed.html").exists());
    assert_eq!(summary.pages_written, 1);
    assert_eq!(summary.skipped, 1);
}

#[tokio::test]
async fn test_redirected_page_resolves_against_final_url() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_html(&server, "/", r#"<a href="/docs">Docs</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/docs/"))
        .expect(1)
        .mount(&server)
        .await;
    mount_html(&server, "/docs/", r#"<img src="a.png">"#).await;
    mount(&server, "/docs/a.png", "PNG", "image/png", 1).await;

    let config = MirrorConfig {
        convert_links: true,
        ..mirror_config(&dir)
    };
    let job = MirrorJob::new(&format!("{}/", server.uri()), &config).unwrap();
    let summary = mirror(job, &HttpConfig::default()).await.unwrap();

    // Stored under the requested URL, image resolved against the redirect target
    let root = mirror_root(&server, &dir);
    assert_eq!(read(&root, "docs.html"), r#"<img src="./docs/a.png">"#);
    assert_eq!(read(&root, "docs/a.png"), "PNG");
    assert_eq!(summary.pages_written, 2);
}
