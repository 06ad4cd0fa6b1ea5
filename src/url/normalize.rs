use crate::UrlError;
use url::Url;

/// Schemes and prefixes that never name a fetchable resource
const SPECIAL_PREFIXES: &[&str] = &["javascript:", "data:", "mailto:", "tel:"];

/// Normalizes a URL into the form used as a visited-set key
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Only HTTP and HTTPS are accepted
/// 3. A host is required
/// 4. Lowercase host, dot-segment removal and default-port elision are
///    performed by the parser; an empty path becomes `/`
/// 5. Remove fragment (everything after #)
/// 6. Remove an empty query string (trailing ?)
///
/// The query string and trailing slashes are kept: they change which file a
/// URL maps to.
///
/// # Examples
///
/// ```
/// use wmirror::url::normalize_url;
///
/// let url = normalize_url("http://EXAMPLE.com:80/a/../page/#top").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/page/");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize(url)
}

/// Normalizes an already parsed URL, see [`normalize_url`]
pub fn normalize(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);

    if url.query() == Some("") {
        url.set_query(None);
    }

    Ok(url)
}

/// Returns true for references that are filtered out before resolution
///
/// Empty, fragment-only (`#...`), `javascript:`, `data:`, `mailto:` and `tel:`
/// references never name a resource to mirror.
pub fn is_special_reference(literal: &str) -> bool {
    let literal = literal.trim();
    if literal.is_empty() || literal.starts_with('#') {
        return true;
    }

    let lower = literal.to_ascii_lowercase();
    SPECIAL_PREFIXES.iter().any(|p| lower.starts_with(p))
}

/// Resolves a reference literal against the URL of the document it appears in
///
/// Returns None if the reference should be ignored:
/// - special references (see [`is_special_reference`])
/// - references that do not resolve to a valid URL
/// - non-HTTP(S) URLs after resolution
pub fn resolve_reference(base: &Url, literal: &str) -> Option<Url> {
    if is_special_reference(literal) {
        return None;
    }

    let joined = base.join(literal.trim()).ok()?;
    normalize(joined).ok()
}
