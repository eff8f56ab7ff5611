//! Seed-URL generation for dossier
//!
//! Turns a free-text company query into candidate URLs: the company website
//! (explicit in the query, or guessed from the name), its well-known
//! subpages, and directory/social profile pages. Pure string work, no
//! network access; the crawler finds out which guesses exist.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

/// Matches an explicit website mention inside a free-text query
static WEBSITE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:https?://)?(?:[a-z0-9-]+\.)+[a-z]{2,}(?:/\S*)?").expect("valid regex")
});

/// Well-known company subpages probed under the primary site
const SUBPAGE_PATHS: &[&str] = &[
    "/about",
    "/about-us",
    "/company",
    "/team",
    "/contact",
    "/products",
    "/services",
    "/blog",
    "/news",
    "/careers",
    "/jobs",
];

/// Generates seed URLs for a company query
///
/// The query may carry an explicit website (`Acme acme.io`); otherwise the
/// primary site is guessed as `https://<compactname>.com`. Candidates are
/// emitted in a fixed order (site root, subpages, directory/social
/// profiles), deduplicated preserving first occurrence, and truncated to
/// `max_urls`. Candidates that fail URL parsing are skipped. An empty or
/// whitespace query yields an empty list.
///
/// # Examples
///
/// ```
/// use dossier::seed::generate;
///
/// let seeds = generate("Acme Robotics", 20);
/// assert_eq!(seeds[0].as_str(), "https://acmerobotics.com/");
/// assert!(seeds.iter().any(|u| u.path() == "/about"));
/// ```
pub fn generate(query: &str, max_urls: usize) -> Vec<Url> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let (site, company_name) = split_site_and_name(query);

    let compact = compact_name(&company_name)
        .or_else(|| site.as_deref().and_then(compact_from_site))
        .unwrap_or_default();

    let mut candidates: Vec<String> = Vec::new();

    let primary = site.unwrap_or_else(|| format!("https://{}.com", compact));
    candidates.push(primary.clone());
    for path in SUBPAGE_PATHS {
        candidates.push(format!("{}{}", primary.trim_end_matches('/'), path));
    }

    if !compact.is_empty() {
        candidates.push(format!("https://www.linkedin.com/company/{}", compact));
        candidates.push(format!("https://www.crunchbase.com/organization/{}", compact));
        candidates.push(format!("https://twitter.com/{}", compact));
        candidates.push(format!("https://www.facebook.com/{}", compact));
    }

    let mut seen = HashSet::new();
    let mut seeds = Vec::new();
    for candidate in candidates {
        let url = match Url::parse(&candidate) {
            Ok(url) => url,
            Err(e) => {
                debug!("Skipping unparsable seed candidate '{}': {}", candidate, e);
                continue;
            }
        };
        if seen.insert(url.to_string()) {
            seeds.push(url);
        }
        if seeds.len() == max_urls {
            break;
        }
    }

    seeds
}

/// Splits a query into an explicit website (if present) and the company name
fn split_site_and_name(query: &str) -> (Option<String>, String) {
    match WEBSITE_RE.find(query) {
        Some(m) => {
            let raw = m.as_str().trim_end_matches(['.', ',']);
            let lower = raw.to_lowercase();
            let site = if lower.starts_with("http://") || lower.starts_with("https://") {
                raw.to_string()
            } else {
                format!("https://{}", raw)
            };
            let name = format!("{}{}", &query[..m.start()], &query[m.end()..])
                .trim()
                .to_string();
            (Some(site), name)
        }
        None => (None, query.to_string()),
    }
}

/// Collapses a company name to the lowercase alphanumeric form used in
/// guessed domains and profile handles
fn compact_name(name: &str) -> Option<String> {
    let compact: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    if compact.is_empty() {
        None
    } else {
        Some(compact)
    }
}

/// Derives a handle from an explicit site when the query has no name left
/// (e.g. the query was just a URL)
fn compact_from_site(site: &str) -> Option<String> {
    let url = Url::parse(site).ok()?;
    let domain = crate::url::registrable_domain(&url)?;
    domain.split('.').next().map(|label| label.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_only_query_guesses_domain() {
        let seeds = generate("Acme Robotics", 20);
        assert_eq!(seeds[0].as_str(), "https://acmerobotics.com/");
    }

    #[test]
    fn test_explicit_site_wins_over_guess() {
        let seeds = generate("Acme Robotics acme.io", 20);
        assert_eq!(seeds[0].as_str(), "https://acme.io/");
        assert!(seeds.iter().all(|u| u.host_str() != Some("acmerobotics.com")));
    }

    #[test]
    fn test_explicit_site_with_scheme_kept() {
        let seeds = generate("Acme http://acme.io", 20);
        assert_eq!(seeds[0].as_str(), "http://acme.io/");
    }

    #[test]
    fn test_subpages_follow_site_root() {
        let seeds = generate("Acme acme.io", 20);
        let paths: Vec<&str> = seeds
            .iter()
            .filter(|u| u.host_str() == Some("acme.io"))
            .map(|u| u.path())
            .collect();
        assert_eq!(paths[0], "/");
        assert_eq!(paths[1], "/about");
        assert!(paths.contains(&"/contact"));
        assert!(paths.contains(&"/careers"));
    }

    #[test]
    fn test_social_profiles_use_compact_name() {
        let seeds = generate("Acme Robotics", 25);
        let linkedin = seeds
            .iter()
            .find(|u| u.host_str() == Some("www.linkedin.com"))
            .expect("linkedin seed");
        assert_eq!(linkedin.path(), "/company/acmerobotics");

        let crunchbase = seeds
            .iter()
            .find(|u| u.host_str() == Some("www.crunchbase.com"))
            .expect("crunchbase seed");
        assert_eq!(crunchbase.path(), "/organization/acmerobotics");
    }

    #[test]
    fn test_url_only_query_derives_handle_from_domain() {
        let seeds = generate("https://acme.io", 25);
        let linkedin = seeds
            .iter()
            .find(|u| u.host_str() == Some("www.linkedin.com"))
            .expect("linkedin seed");
        assert_eq!(linkedin.path(), "/company/acme");
    }

    #[test]
    fn test_truncation() {
        let seeds = generate("Acme Robotics", 3);
        assert_eq!(seeds.len(), 3);
    }

    #[test]
    fn test_empty_query_yields_no_seeds() {
        assert!(generate("", 20).is_empty());
        assert!(generate("   ", 20).is_empty());
    }

    #[test]
    fn test_deduplication_preserves_first_occurrence() {
        // Root and "/" subpage collapse to the same URL string
        let seeds = generate("Acme acme.io/", 20);
        let roots = seeds
            .iter()
            .filter(|u| u.host_str() == Some("acme.io") && u.path() == "/")
            .count();
        assert_eq!(roots, 1);
    }

    #[test]
    fn test_dotted_abbreviations_are_not_websites() {
        let seeds = generate("Acme Inc. Worldwide", 20);
        assert_eq!(seeds[0].as_str(), "https://acmeincworldwide.com/");
    }
}
