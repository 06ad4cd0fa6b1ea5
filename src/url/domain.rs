use url::Url;

/// Extracts the domain from a URL
///
/// The host is returned lowercased. If the URL has no host, it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use wmirror::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Name of the directory a mirror of `url` is stored under
///
/// This is the host, followed by `:port` when the URL names a non-default
/// port, so that two servers on one host do not share a mirror root.
pub fn mirror_root_name(url: &Url) -> Option<String> {
    let host = extract_domain(url)?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// Checks whether `candidate` is `base` or one of its subdomains
///
/// Hosts are compared label by label from the end: the candidate must have at
/// least as many labels as the base host and match it on every trailing label.
///
/// # Examples
///
/// ```
/// use wmirror::url::is_same_or_subdomain;
///
/// assert!(is_same_or_subdomain("example.com", "example.com"));
/// assert!(is_same_or_subdomain("example.com", "shop.example.com"));
/// assert!(!is_same_or_subdomain("example.com", "evil.com"));
/// assert!(!is_same_or_subdomain("example.com", "notexample.com"));
/// ```
pub fn is_same_or_subdomain(base: &str, candidate: &str) -> bool {
    let base = base.to_ascii_lowercase();
    let candidate = candidate.to_ascii_lowercase();

    let base_labels: Vec<&str> = base.split('.').collect();
    let candidate_labels: Vec<&str> = candidate.split('.').collect();

    if candidate_labels.len() < base_labels.len() {
        return false;
    }

    base_labels
        .iter()
        .rev()
        .zip(candidate_labels.iter().rev())
        .all(|(b, c)| b == c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_domain() {
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_extract_with_port() {
        let url = Url::parse("https://example.com:8080/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_extract_mixed_case() {
        let url = Url::parse("https://Example.COM/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_mirror_root_name() {
        let url = Url::parse("http://example.com/a/b").unwrap();
        assert_eq!(mirror_root_name(&url), Some("example.com".to_string()));

        let url = Url::parse("http://127.0.0.1:8080/").unwrap();
        assert_eq!(mirror_root_name(&url), Some("127.0.0.1:8080".to_string()));

        // Default ports are elided by the parser
        let url = Url::parse("https://example.com:443/").unwrap();
        assert_eq!(mirror_root_name(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_same_domain() {
        assert!(is_same_or_subdomain("example.com", "example.com"));
    }

    #[test]
    fn test_subdomains() {
        assert!(is_same_or_subdomain("example.com", "shop.example.com"));
        assert!(is_same_or_subdomain("example.com", "a.b.example.com"));
    }

    #[test]
    fn test_external_domains() {
        assert!(!is_same_or_subdomain("example.com", "evil.com"));
        assert!(!is_same_or_subdomain("example.com", "notexample.com"));
        assert!(!is_same_or_subdomain("example.com", "example.org"));
        assert!(!is_same_or_subdomain("example.com", "example.com.evil.org"));
    }

    #[test]
    fn test_parent_domain_is_not_in_scope() {
        assert!(!is_same_or_subdomain("shop.example.com", "example.com"));
        assert!(!is_same_or_subdomain("shop.example.com", "blog.example.com"));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(is_same_or_subdomain("Example.com", "SHOP.example.COM"));
    }

    #[test]
    fn test_ip_hosts() {
        assert!(is_same_or_subdomain("127.0.0.1", "127.0.0.1"));
        assert!(!is_same_or_subdomain("127.0.0.1", "127.0.0.2"));
    }
}
