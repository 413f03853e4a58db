//! HTTP transport for the dispatch manager
//!
//! This module handles the single GET each dispatched task performs:
//! - Building an HTTP client with the crawler's user agent and timeout
//! - Following redirects and recording the resolved URL
//! - Downloading bodies only for HTML pages served with status 200
//! - Turning every transport fault into an error-carrying [`FetchResult`]

use crate::config::{DispatchConfig, UserAgentConfig};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Transport-level failure of a single fetch
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Request timeout")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to read body: {0}")]
    Body(String),

    #[error("Fetch task failed: {0}")]
    TaskFailed(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_connect() {
            FetchError::Connect(e.to_string())
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

/// Outcome of fetching one URL
///
/// Produced for every submitted URL, whether or not the fetch succeeded.
/// When `error` is set the remaining response fields are empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    /// The URL that was submitted
    pub requested_url: String,
    /// Final URL after redirects
    pub resolved_url: String,
    /// HTTP status code
    pub status: Option<u16>,
    /// Content-Type header value
    pub content_type: Option<String>,
    /// Page body; only downloaded for HTML pages served with status 200
    pub body: Option<String>,
    /// Set when the request never produced a usable response
    pub error: Option<FetchError>,
}

impl FetchResult {
    /// Builds a result for a response that was received
    pub fn response(
        requested_url: impl Into<String>,
        resolved_url: impl Into<String>,
        status: u16,
        content_type: Option<String>,
        body: Option<String>,
    ) -> Self {
        Self {
            requested_url: requested_url.into(),
            resolved_url: resolved_url.into(),
            status: Some(status),
            content_type,
            body,
            error: None,
        }
    }

    /// Shorthand for a 200 `text/html` response without redirects
    pub fn html(url: impl Into<String>, body: impl Into<String>) -> Self {
        let url = url.into();
        Self::response(
            url.clone(),
            url,
            200,
            Some("text/html; charset=utf-8".to_string()),
            Some(body.into()),
        )
    }

    /// Builds the error sentinel for a fetch that failed
    pub fn failed(requested_url: impl Into<String>, error: FetchError) -> Self {
        let requested_url = requested_url.into();
        Self {
            resolved_url: requested_url.clone(),
            requested_url,
            status: None,
            content_type: None,
            body: None,
            error: Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// True when the response declared an HTML content type
    pub fn is_html(&self) -> bool {
        self.content_type.as_deref().map_or(false, is_html_content_type)
    }

    /// True for an error-free 200 HTML response
    pub fn is_fetchable_page(&self) -> bool {
        !self.is_error() && self.status == Some(200) && self.is_html()
    }
}

/// Checks whether a Content-Type header denotes an HTML document
pub fn is_html_content_type(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("text/html")
}

/// Performs the single GET request behind each dispatched task
///
/// Implementations must never panic or return early with an error: every
/// failure is reported through [`FetchResult::error`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> FetchResult;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `timeout` - Timeout applied to each request
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use press_ripple::config::UserAgentConfig;
/// use press_ripple::dispatch::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(5)).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Transport`] backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the client from the dispatch and user agent configuration
    pub fn from_config(
        dispatch: &DispatchConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, reqwest::Error> {
        let timeout = Duration::from_millis(dispatch.request_timeout_ms);
        Ok(Self::new(build_http_client(user_agent, timeout)?))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> FetchResult {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                let error = FetchError::from(e);
                tracing::error!("Request to {} failed: {}", url, error);
                return FetchResult::failed(url, error);
            }
        };

        let status = response.status();
        let resolved_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        tracing::debug!("Response from {} received: HTTP {}", url, status.as_u16());

        let wants_body =
            status == StatusCode::OK && content_type.as_deref().map_or(false, is_html_content_type);
        if !wants_body {
            return FetchResult::response(url, resolved_url, status.as_u16(), content_type, None);
        }

        match response.text().await {
            Ok(body) => {
                FetchResult::response(url, resolved_url, status.as_u16(), content_type, Some(body))
            }
            Err(e) => {
                tracing::error!("Failed to read body from {}: {}", url, e);
                FetchResult::failed(url, FetchError::Body(e.to_string()))
            }
        }
    }
}
