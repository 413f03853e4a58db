//! Accepted documents produced by a crawl round

use scraper::Html;
use url::Url;

/// A page the classifier accepted as an article
#[derive(Debug, Clone)]
pub struct Article {
    /// Resolved (post-redirect) URL of the page
    pub url: Url,

    /// Text of the `<title>` tag, if any
    pub title: Option<String>,

    /// Classifier score that admitted the page
    pub confidence: f64,

    /// The parsed document, handed to downstream consumers as-is
    pub document: Html,
}

impl Article {
    /// Title for display, falling back to a placeholder
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("No Title")
    }
}

/// The articles accepted during one crawl round, in fetch submission order
#[derive(Debug, Clone)]
pub struct DocumentBatch {
    round: u32,
    articles: Vec<Article>,
}

impl DocumentBatch {
    pub(crate) fn new(round: u32) -> Self {
        Self {
            round,
            articles: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, article: Article) {
        self.articles.push(article);
    }

    /// The round (starting at 1) this batch was produced by
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Article> {
        self.articles.iter()
    }

    /// URLs of the accepted articles
    pub fn urls(&self) -> Vec<&str> {
        self.articles.iter().map(|a| a.url.as_str()).collect()
    }
}

impl IntoIterator for DocumentBatch {
    type Item = Article;
    type IntoIter = std::vec::IntoIter<Article>;

    fn into_iter(self) -> Self::IntoIter {
        self.articles.into_iter()
    }
}

impl<'a> IntoIterator for &'a DocumentBatch {
    type Item = &'a Article;
    type IntoIter = std::slice::Iter<'a, Article>;

    fn into_iter(self) -> Self::IntoIter {
        self.articles.iter()
    }
}
