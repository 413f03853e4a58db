//! Press-Ripple: an article harvester for news sites
//!
//! This crate crawls outward from a seed URL on a single site, paces its
//! requests according to current load, and classifies each fetched page as
//! an article or a listing page. Accepted articles are yielded one batch per
//! crawl round.

pub mod classifier;
pub mod config;
pub mod crawler;
pub mod dispatch;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Press-Ripple operations
///
/// Only configuration and setup failures surface through this type. Failures
/// of individual fetches or documents are recorded per URL and never abort a
/// crawl.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Press-Ripple operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use classifier::{classify, ArticleClassifier, ClassificationResult};
pub use config::Config;
pub use crawler::{Article, Crawl, CrawlSession, DocumentBatch};
pub use dispatch::{DispatchManager, FetchError, FetchResult, HttpTransport, Transport};
pub use state::PageState;
pub use crate::url::{belongs_to_site, SiteScope};
