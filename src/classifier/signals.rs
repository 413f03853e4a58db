//! Individual article heuristics
//!
//! Each signal looks at either the URL or the parsed document and returns its
//! contribution to the confidence score. Signals never look at each other.

use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

pub const DATE_IN_URL: f64 = 0.25;
pub const ARTICLE_WORD_IN_URL: f64 = 0.10;
pub const LISTING_TERM_IN_URL: f64 = -0.40;
pub const HEADLINE: f64 = 0.10;
pub const OG_TYPE_ARTICLE: f64 = 0.30;
pub const PUBLISHED_TIME: f64 = 0.20;
pub const ARTICLE_ELEMENT: f64 = 0.20;
pub const ARTICLE_CONTAINER: f64 = 0.20;
pub const TEXT_DENSITY: f64 = 0.20;

/// Paragraph count at which a page counts as text-dense
pub const DENSE_PARAGRAPH_COUNT: usize = 5;

/// Word count above which a page counts as text-dense
pub const DENSE_WORD_COUNT: usize = 300;

/// URL terms that mark listing, index and navigation pages
pub const LISTING_TERMS: &[&str] = &["category", "tag", "search", "archive", "feed", "page"];

// Ordered most to least specific; only the first match scores.
static DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\d{4}/\d{2}/\d{2}",
        r"\d{4}-\d{2}-\d{2}",
        r"\d{4}/\d{2}",
        r"\d{4}-\d{2}",
        r"\d{4}",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid date pattern"))
    .collect()
});

macro_rules! selector {
    ($s:expr) => {
        LazyLock::new(|| Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s)))
    };
}

static HEADLINE_SELECTOR: LazyLock<Selector> = selector!("h1, h2");
static META_SELECTOR: LazyLock<Selector> = selector!("meta");
static ARTICLE_SELECTOR: LazyLock<Selector> = selector!("article");
static CONTAINER_SELECTOR: LazyLock<Selector> = selector!("main, section");
static PARAGRAPH_SELECTOR: LazyLock<Selector> = selector!("p");

/// +0.25 when the URL carries a date such as `2024/05/01` or a bare year
pub fn date_in_url(url: &str) -> f64 {
    match DATE_PATTERNS.iter().find(|re| re.is_match(url)) {
        Some(_) => DATE_IN_URL,
        None => 0.0,
    }
}

/// +0.10 when the URL mentions "article" or "post" (case-sensitive)
pub fn article_word_in_url(url: &str) -> f64 {
    if url.contains("article") || url.contains("post") {
        ARTICLE_WORD_IN_URL
    } else {
        0.0
    }
}

/// -0.40 when the URL looks like a listing page (case-insensitive)
pub fn listing_term_in_url(url: &str) -> f64 {
    let lowered = url.to_lowercase();
    if LISTING_TERMS.iter().any(|term| lowered.contains(term)) {
        LISTING_TERM_IN_URL
    } else {
        0.0
    }
}

/// +0.10 when the document has an `<h1>` or `<h2>`
pub fn headline(document: &Html) -> f64 {
    if document.select(&HEADLINE_SELECTOR).next().is_some() {
        HEADLINE
    } else {
        0.0
    }
}

/// +0.30 for `og:type=article`, +0.20 for `article:published_time`
pub fn metadata(document: &Html) -> f64 {
    let mut og_article = false;
    let mut published_time = false;

    for meta in document.select(&META_SELECTOR) {
        let meta = meta.value();
        if meta.attr("property") == Some("og:type") && meta.attr("content") == Some("article") {
            og_article = true;
        }
        if meta.attr("name") == Some("article:published_time") {
            published_time = true;
        }
    }

    let mut score = 0.0;
    if og_article {
        score += OG_TYPE_ARTICLE;
    }
    if published_time {
        score += PUBLISHED_TIME;
    }
    score
}

/// +0.20 for any `<article>`, plus +0.20 per article-like `<main>`/`<section>`
///
/// A container is article-like when its `role` is "article" or its class
/// list contains the exact token "article".
pub fn article_markup(document: &Html) -> f64 {
    let mut score = 0.0;

    if document.select(&ARTICLE_SELECTOR).next().is_some() {
        score += ARTICLE_ELEMENT;
    }

    for container in document.select(&CONTAINER_SELECTOR) {
        let element = container.value();
        let by_role = element.attr("role") == Some("article");
        let by_class = element.classes().any(|class| class == "article");
        if by_role || by_class {
            score += ARTICLE_CONTAINER;
        }
    }

    score
}

/// +0.20 for pages with at least 5 paragraphs or more than 300 words of them
pub fn text_density(document: &Html) -> f64 {
    let paragraphs: Vec<_> = document.select(&PARAGRAPH_SELECTOR).collect();

    if paragraphs.len() >= DENSE_PARAGRAPH_COUNT {
        return TEXT_DENSITY;
    }

    let words: usize = paragraphs
        .iter()
        .map(|p| p.text().collect::<String>().split_whitespace().count())
        .sum();
    if words > DENSE_WORD_COUNT {
        return TEXT_DENSITY;
    }

    0.0
}
