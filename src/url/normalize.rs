use crate::UrlError;
use url::Url;

/// Normalizes a URL into the identity used for deduplication
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Require an HTTP or HTTPS scheme
/// 3. Require a host
/// 4. Remove the fragment (everything after #)
///
/// Host lowercasing, default-port removal and dot-segment removal are done by
/// the URL parser itself. Query strings are kept as-is: news sites often put
/// the article id there.
///
/// # Examples
///
/// ```
/// use press_ripple::url::normalize_url;
///
/// let url = normalize_url("https://EXAMPLE.com:443/a/../story#comments").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/story");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize_parsed(url)
}

/// Normalizes an already-parsed URL (see [`normalize_url`])
pub fn normalize_parsed(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    Ok(url)
}

/// Returns the deduplication key for a URL string
///
/// Strings that do not normalize are returned unchanged so that they still
/// have a stable identity.
pub fn url_identity(url_str: &str) -> String {
    normalize_url(url_str)
        .map(String::from)
        .unwrap_or_else(|_| url_str.to_string())
}
