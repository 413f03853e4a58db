//! URL handling module for Press-Ripple
//!
//! This module provides URL identity (normalization for deduplication) and
//! domain scoping: deciding whether a link stays on the crawled site.

mod normalize;
mod site;

// Re-export main functions
pub use normalize::{normalize_parsed, normalize_url, url_identity};
pub use site::{authority, belongs_to_site, SiteScope};
