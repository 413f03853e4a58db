//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageState`: What happened to each fetched URL in a round

mod page_state;

pub use page_state::PageState;
