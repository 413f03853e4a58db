use serde::Deserialize;

/// Main configuration structure for Press-Ripple
///
/// Every section is optional; missing sections and keys fall back to the
/// defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

/// Request dispatch configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    /// Maximum number of fetches in flight at once (the concurrency ceiling)
    #[serde(rename = "max-concurrent-requests", default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Timeout applied to each individual fetch (milliseconds)
    #[serde(rename = "request-timeout-ms", default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Article classifier configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    /// Minimum score for a page to count as an article
    #[serde(rename = "confidence-threshold", default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
}

/// Frontier traversal configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of crawl rounds to run from the seed page
    #[serde(rename = "max-iterations", default = "default_max_iterations")]
    pub max_iterations: u32,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version`
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.crawler_name, self.crawler_version)
    }
}

fn default_max_concurrent_requests() -> usize {
    256
}

fn default_request_timeout_ms() -> u64 {
    5_000
}

fn default_confidence_threshold() -> f64 {
    0.7
}

fn default_max_iterations() -> u32 {
    2
}

fn default_crawler_name() -> String {
    "press-ripple".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: default_max_concurrent_requests(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
        }
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
        }
    }
}
