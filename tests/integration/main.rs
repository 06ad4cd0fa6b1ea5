//! Integration tests for wmirror
//!
//! These tests use wiremock to create mock HTTP servers and exercise the
//! mirror and the downloader end-to-end against real temporary directories.

mod download_tests;
mod mirror_tests;
