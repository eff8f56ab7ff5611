use url::{Host, Url};

/// Extracts the registrable domain of a URL
///
/// The registrable domain is the public-suffix-aware base domain: one label
/// beyond the public suffix. It is the unit of crawl scoping, so every
/// subdomain of one organization's site compares equal.
///
/// Hosts the public-suffix list cannot split (IP literals, single-label
/// names like `localhost`) fall back to the full host, lowercased. Loopback
/// test servers scope correctly because of this.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use dossier::url::registrable_domain;
///
/// let url = Url::parse("https://blog.example.com/post").unwrap();
/// assert_eq!(registrable_domain(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("https://sub.example.co.uk/").unwrap();
/// assert_eq!(registrable_domain(&url), Some("example.co.uk".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(registrable_domain(&url), Some("127.0.0.1".to_string()));
/// ```
pub fn registrable_domain(url: &Url) -> Option<String> {
    match url.host()? {
        Host::Domain(host) => {
            let host = host.to_lowercase();
            match psl::domain_str(&host) {
                Some(domain) => Some(domain.to_string()),
                None => Some(host),
            }
        }
        // The suffix list does not apply to IP literals
        Host::Ipv4(addr) => Some(addr.to_string()),
        Host::Ipv6(addr) => Some(addr.to_string()),
    }
}

/// Checks whether a URL belongs to a crawl scope
///
/// The scope string is a registrable domain as produced by
/// [`registrable_domain`].
pub fn in_scope(url: &Url, scope: &str) -> bool {
    registrable_domain(url).as_deref() == Some(scope)
}
