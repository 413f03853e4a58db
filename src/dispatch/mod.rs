//! Request dispatch for the crawler
//!
//! This module knows nothing about crawling. It takes a batch of URLs and
//! returns one [`FetchResult`] per URL, including:
//! - Bounding how many fetches are in flight at once
//! - Pacing submissions according to the current load
//! - Converting every transport failure into a result instead of an error

mod load;
mod manager;
mod transport;

pub use load::{LoadLevel, LoadSample};
pub use manager::DispatchManager;
pub use transport::{
    build_http_client, is_html_content_type, FetchError, FetchResult, HttpTransport, Transport,
};
