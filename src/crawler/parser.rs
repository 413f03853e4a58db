//! HTML parser for extracting links and metadata
//!
//! This module handles parsing fetched bodies into documents and extracting:
//! - Links to follow (from <a> tags and canonical links)
//! - Page title

use crate::url::normalize_parsed;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use thiserror::Error;
use url::Url;

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("Invalid CSS selector: title"));
static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("Invalid CSS selector: a[href]"));
static CANONICAL_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("link[rel='canonical'][href]")
        .expect("Invalid CSS selector: link[rel='canonical'][href]")
});

/// Why a fetched body could not be turned into a document
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Response has no body")]
    MissingBody,

    #[error("Document is empty")]
    EmptyDocument,
}

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The parsed document
    pub document: Html,

    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// All followable links found on the page (absolute, fragment-free)
    pub links: Vec<Url>,
}

/// Parses an optional response body
///
/// # Returns
///
/// * `Ok(ParsedPage)` - The body was present and non-blank
/// * `Err(ParseError)` - There is nothing to parse
pub fn parse_body(body: Option<&str>, base_url: &Url) -> Result<ParsedPage, ParseError> {
    parse_html(body.ok_or(ParseError::MissingBody)?, base_url)
}

/// Parses HTML content and extracts links and metadata
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags
/// - `<link rel="canonical" href="...">`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links (same page anchors)
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The base URL for resolving relative links
///
/// # Example
///
/// ```
/// use press_ripple::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head>
///     <body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url).unwrap();
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links[0].as_str(), "https://example.com/page");
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> Result<ParsedPage, ParseError> {
    if html.trim().is_empty() {
        return Err(ParseError::EmptyDocument);
    }

    let document = Html::parse_document(html);
    let title = extract_title(&document);
    let links = extract_links(&document, base_url);

    Ok(ParsedPage {
        document,
        title,
        links,
    })
}

/// Extracts the page title from the HTML document
pub fn extract_title(document: &Html) -> Option<String> {
    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts all valid links from the HTML document
pub fn extract_links(document: &Html, base_url: &Url) -> Vec<Url> {
    let mut links = Vec::new();

    for element in document.select(&ANCHOR_SELECTOR) {
        // Skip if it has the download attribute
        if element.value().attr("download").is_some() {
            continue;
        }

        let href = element.value().attr("href");
        if let Some(absolute_url) = href.and_then(|h| resolve_link(h, base_url)) {
            links.push(absolute_url);
        }
    }

    for element in document.select(&CANONICAL_SELECTOR) {
        let href = element.value().attr("href");
        if let Some(absolute_url) = href.and_then(|h| resolve_link(h, base_url)) {
            links.push(absolute_url);
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    base_url
        .join(href)
        .ok()
        .and_then(|absolute_url| normalize_parsed(absolute_url).ok())
}
