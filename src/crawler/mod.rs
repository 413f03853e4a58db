//! Crawler module for site-scoped article discovery
//!
//! This module contains the frontier controller, including:
//! - HTML parsing and link extraction
//! - The crawl session and its lazy per-round batches
//! - Crawl statistics

mod batch;
mod parser;
mod session;
mod stats;

pub use batch::{Article, DocumentBatch};
pub use parser::{parse_body, parse_html, ParseError, ParsedPage};
pub use session::{Crawl, CrawlSession};
pub use stats::{print_statistics, CrawlStatistics};
