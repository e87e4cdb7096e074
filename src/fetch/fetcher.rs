//! HTTP page fetcher
//!
//! This module handles all HTTP requests for a grab, including:
//! - Building an HTTP client with a proper user agent string
//! - GET requests for listing pages
//! - Classifying upstream failures into the closed [`FetchError`] taxonomy
//!
//! No retries are performed at this layer. A failure on any page is
//! terminal for the request that issued it.

use crate::FetchError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Capability to fetch one listing page and return its body.
///
/// The engine consumes this trait so tests can substitute a stub, and so
/// the integration tests can point the real [`HttpFetcher`] at a mock
/// server.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches a single page, returning its HTML body.
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(concat!("reel-diff/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetcher backed by a real HTTP client
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a freshly built client
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client()?,
        })
    }

    /// Creates a fetcher reusing an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    /// Fetches a page and classifies failures.
    ///
    /// Status mapping:
    ///
    /// | Status | Classification |
    /// |--------|----------------|
    /// | 404 | `NotFound` |
    /// | 401 | `PrivateRoute` |
    /// | 403, 429 | `AccessDenied` |
    /// | other non-2xx | `InvalidResponse` |
    ///
    /// A non-HTML Content-Type or a transport failure (timeout, refused
    /// connection, broken body) is also `InvalidResponse`.
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        match status {
            StatusCode::NOT_FOUND => return Err(FetchError::NotFound),
            StatusCode::UNAUTHORIZED => return Err(FetchError::PrivateRoute),
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
                return Err(FetchError::AccessDenied)
            }
            _ => {}
        }

        if !status.is_success() {
            return Err(FetchError::InvalidResponse {
                reason: format!("unexpected status {}", status),
            });
        }

        // A successful response that isn't HTML is an upstream shape change
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !content_type.is_empty() && !content_type.contains("html") {
            return Err(FetchError::InvalidResponse {
                reason: format!("unexpected content type {:?}", content_type),
            });
        }

        response.text().await.map_err(classify_transport_error)
    }
}

/// Maps a reqwest transport failure to the closed taxonomy
fn classify_transport_error(e: reqwest::Error) -> FetchError {
    let reason = if e.is_timeout() {
        "request timeout".to_string()
    } else if e.is_connect() {
        "connection refused".to_string()
    } else {
        e.to_string()
    };
    FetchError::InvalidResponse { reason }
}
