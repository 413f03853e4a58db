use crate::url::normalize::{normalize_parsed, normalize_url};
use crate::UrlResult;
use url::{Origin, Url};

/// Returns the network authority of a URL as `scheme://host[:port]`
///
/// Default ports are omitted, so `https://example.com:443/` and
/// `https://example.com/` share an authority. URLs without a tuple origin
/// (`data:`, `file:` and friends) have none.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use press_ripple::url::authority;
///
/// let url = Url::parse("https://News.Example.com/world").unwrap();
/// assert_eq!(authority(&url), Some("https://news.example.com".to_string()));
///
/// let url = Url::parse("http://localhost:8080/a").unwrap();
/// assert_eq!(authority(&url), Some("http://localhost:8080".to_string()));
/// ```
pub fn authority(url: &Url) -> Option<String> {
    let origin = url.origin();
    if origin.is_tuple() {
        Some(origin.ascii_serialization())
    } else {
        None
    }
}

/// Checks whether `candidate` belongs to the same site as `root`
///
/// The candidate is resolved against the root first, so relative links are
/// judged by where they actually point. Two URLs belong to the same site when
/// their scheme, host and port all agree.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use press_ripple::url::belongs_to_site;
///
/// let root = Url::parse("https://site.com/").unwrap();
/// assert!(belongs_to_site(&root, "/2024/05/01/story"));
/// assert!(belongs_to_site(&root, "https://site.com/world"));
/// assert!(!belongs_to_site(&root, "https://cdn.site.com/world"));
/// assert!(!belongs_to_site(&root, "http://site.com/world"));
/// ```
pub fn belongs_to_site(root: &Url, candidate: &str) -> bool {
    resolve_within(root, &root.origin(), candidate).is_some()
}

/// Resolves `candidate` against `root`, keeping it only if it stays on site
fn resolve_within(root: &Url, origin: &Origin, candidate: &str) -> Option<Url> {
    let resolved = root.join(candidate.trim()).ok()?;
    if origin.is_tuple() && *origin == resolved.origin() {
        Some(resolved)
    } else {
        None
    }
}

/// The domain scope of one crawl: a root URL and its network authority
#[derive(Debug, Clone)]
pub struct SiteScope {
    root: Url,
    origin: Origin,
}

impl SiteScope {
    /// Creates a scope rooted at `root_url`
    ///
    /// # Returns
    ///
    /// * `Ok(SiteScope)` - The root is an absolute http(s) URL with a host
    /// * `Err(UrlError)` - The root cannot anchor a crawl
    pub fn new(root_url: &str) -> UrlResult<Self> {
        let root = normalize_url(root_url)?;
        let origin = root.origin();
        Ok(Self { root, origin })
    }

    /// The root URL of the crawl
    pub fn root(&self) -> &Url {
        &self.root
    }

    /// The root's network authority
    pub fn authority(&self) -> String {
        self.origin.ascii_serialization()
    }

    /// Checks whether a candidate (relative or absolute) is on this site
    pub fn belongs_to_site(&self, candidate: &str) -> bool {
        self.resolve_on_site(candidate).is_some()
    }

    /// Resolves a candidate to its URL identity if it is on this site
    ///
    /// Every scoping decision of a crawl goes through here: the seed page's
    /// links, redirect targets and links found during rounds.
    pub fn resolve_on_site(&self, candidate: &str) -> Option<Url> {
        resolve_within(&self.root, &self.origin, candidate)
            .and_then(|url| normalize_parsed(url).ok())
    }
}
