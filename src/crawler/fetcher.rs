//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made while mirroring:
//! - Building HTTP clients from the `[http]` configuration
//! - GET requests with redirect following
//! - Error classification
//!
//! The mirror only depends on the [`Fetcher`] trait, so tests can substitute an
//! in-memory fetcher for [`HttpFetcher`].

use crate::config::HttpConfig;
use crate::FetchError;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client};
use std::future::Future;
use std::time::Duration;
use url::Url;

/// Response returned by a [`Fetcher`]
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// HTTP status code of the final response
    pub status: u16,
    /// Content-Type header value, if any
    pub content_type: Option<String>,
    /// Raw response body
    pub body: Vec<u8>,
    /// URL of the final response after redirects
    pub final_url: Url,
}

impl FetchResponse {
    /// True for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// True if the Content-Type names an HTML document
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .map_or(false, |ct| ct.to_ascii_lowercase().contains("text/html"))
    }
}

/// Fetches the bytes behind a URL
///
/// Implementations follow redirects and return the final response whatever
/// its status; only transport failures are errors.
pub trait Fetcher {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<FetchResponse, FetchError>> + Send;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use wmirror::config::HttpConfig;
/// use wmirror::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Fetcher`] backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_error(url, e))?
            .to_vec();

        tracing::debug!("GET {} -> {} ({} bytes)", url, status, body.len());

        Ok(FetchResponse {
            status,
            content_type,
            body,
            final_url,
        })
    }
}

/// Maps a reqwest error onto the fetch error taxonomy
pub(crate) fn classify_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
