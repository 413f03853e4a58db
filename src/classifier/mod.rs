//! Article classifier
//!
//! Decides whether a fetched page is an article or a listing/index page by
//! summing independent URL and markup heuristics into a confidence score.
//! Classification is a pure function of its inputs.
//!
//! | signal | contribution |
//! |--------|--------------|
//! | date in URL (first matching pattern) | +0.25 |
//! | "article" or "post" in URL | +0.10 |
//! | listing term in URL | -0.40 |
//! | `<h1>` or `<h2>` present | +0.10 |
//! | `og:type=article` meta | +0.30 |
//! | `article:published_time` meta | +0.20 |
//! | any `<article>` | +0.20 |
//! | each article-like `<main>`/`<section>` | +0.20 |
//! | 5+ paragraphs, otherwise more than 300 words | +0.20 |
//!
//! The score is not clamped.

pub mod signals;

use scraper::Html;

/// Threshold used when none is configured
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Outcome of classifying one page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassificationResult {
    /// Whether the page is considered an article
    pub accepted: bool,
    /// The summed heuristic score
    pub confidence: f64,
}

/// Scores `url` and `document` and compares the score to `threshold`
///
/// # Example
///
/// ```
/// use press_ripple::classify;
/// use scraper::Html;
///
/// let document = Html::parse_document("<html><body></body></html>");
/// let result = classify("https://site.com/category/tech", &document, 0.7);
/// assert!(!result.accepted);
/// assert_eq!(result.confidence, -0.4);
/// ```
pub fn classify(url: &str, document: &Html, threshold: f64) -> ClassificationResult {
    let confidence = score(url, document);
    ClassificationResult {
        accepted: confidence >= threshold,
        confidence,
    }
}

/// Sums every signal for a page
pub fn score(url: &str, document: &Html) -> f64 {
    let mut confidence = 0.0;
    confidence += signals::date_in_url(url);
    confidence += signals::article_word_in_url(url);
    confidence += signals::listing_term_in_url(url);
    confidence += signals::headline(document);
    confidence += signals::metadata(document);
    confidence += signals::article_markup(document);
    confidence += signals::text_density(document);
    confidence
}

/// A classifier bound to a confidence threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArticleClassifier {
    threshold: f64,
}

impl ArticleClassifier {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn classify(&self, url: &str, document: &Html) -> ClassificationResult {
        classify(url, document, self.threshold)
    }
}

impl Default for ArticleClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE_THRESHOLD)
    }
}
