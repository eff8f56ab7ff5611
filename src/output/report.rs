//! Terminal report and JSON export for research results

use crate::crawler::SiteResult;
use crate::output::cleanup::clean_text;
use crate::Result;
use std::path::Path;

const PAGE_SNIPPET_CHARS: usize = 400;
const DOCUMENT_SNIPPET_CHARS: usize = 200;

/// Formats research results as a sectioned terminal report
///
/// One block per site: the pages with title, description, and a cleaned
/// narrative snippet, followed by the downloaded documents.
pub fn format_report(results: &[SiteResult]) -> String {
    let mut report = String::new();

    for site in results {
        report.push_str(&"=".repeat(72));
        report.push('\n');
        report.push_str(&format!("Site: {}\n", site.seed_url));
        report.push_str(&format!(
            "Pages: {}    Documents: {}\n",
            site.pages.len(),
            site.documents.len()
        ));
        report.push_str(&"=".repeat(72));
        report.push_str("\n\n");

        for page in &site.pages {
            let title = if page.title.is_empty() {
                "(untitled)"
            } else {
                &page.title
            };
            report.push_str(&format!("--- {} ---\n", title));
            report.push_str(&format!("URL: {}\n", page.url));
            if !page.meta_description.is_empty() {
                report.push_str(&format!(
                    "Description: {}\n",
                    clean_text(&page.meta_description)
                ));
            }
            let narrative = clean_text(&page.text);
            if !narrative.is_empty() {
                report.push_str(&snippet(&narrative, PAGE_SNIPPET_CHARS));
                report.push('\n');
            }
            report.push('\n');
        }

        if !site.documents.is_empty() {
            report.push_str("Documents:\n");
            for document in &site.documents {
                let format = document
                    .format
                    .map(|format| format.name())
                    .unwrap_or("unknown");
                report.push_str(&format!("  [{}] {}\n", format, document.source_url));
                if !document.storage_location.as_os_str().is_empty() {
                    report.push_str(&format!(
                        "        stored at {}\n",
                        document.storage_location.display()
                    ));
                }
                let text = clean_text(&document.extracted_text());
                if !text.is_empty() {
                    report.push_str(&format!(
                        "        {}\n",
                        snippet(&text, DOCUMENT_SNIPPET_CHARS)
                    ));
                }
            }
            report.push('\n');
        }
    }

    report
}

/// Writes the full results as pretty JSON
pub fn write_json(results: &[SiteResult], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(path, json)?;
    tracing::info!(path = %path.display(), sites = results.len(), "Wrote JSON results");
    Ok(())
}

/// Truncates to a character budget, never splitting a code point
fn snippet(text: &str, limit: usize) -> String {
    let mut out = String::new();
    for (taken, c) in text.chars().enumerate() {
        if taken == limit {
            return format!("{}...", out.trim_end());
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::{DocumentRecord, DocumentText};
    use crate::extract::extract_page;
    use url::Url;

    fn sample_site() -> SiteResult {
        let url = Url::parse("https://acme.com/").unwrap();
        let html = r#"<html>
            <head><title>Acme Corp</title>
            <meta name="description" content="Anvils  since   1920"></head>
            <body><article><p>We make **heavy** anvils.</p></article></body>
        </html>"#;
        let page = extract_page(html, &url);

        let document = DocumentRecord {
            source_url: Url::parse("https://acme.com/specs.pdf").unwrap(),
            format: Some(crate::documents::DocumentFormat::Pdf),
            storage_location: "downloads/abcd1234-specs.pdf".into(),
            text: DocumentText::Extracted("Load   limit:  5t".to_string()),
        };

        SiteResult {
            seed_url: url,
            pages: vec![page],
            documents: vec![document],
        }
    }

    #[test]
    fn test_report_includes_page_and_document_sections() {
        let report = format_report(&[sample_site()]);

        assert!(report.contains("Site: https://acme.com/"));
        assert!(report.contains("--- Acme Corp ---"));
        assert!(report.contains("Description: Anvils since 1920"));
        assert!(report.contains("We make heavy anvils."));
        assert!(report.contains("[PDF] https://acme.com/specs.pdf"));
        assert!(report.contains("stored at downloads/abcd1234-specs.pdf"));
        assert!(report.contains("Load limit: 5t"));
    }

    #[test]
    fn test_report_for_empty_results() {
        assert_eq!(format_report(&[]), "");
    }

    #[test]
    fn test_untitled_page_gets_placeholder() {
        let url = Url::parse("https://acme.com/").unwrap();
        let page = extract_page("<p>bare</p>", &url);
        let site = SiteResult {
            seed_url: url,
            pages: vec![page],
            documents: vec![],
        };

        let report = format_report(&[site]);
        assert!(report.contains("--- (untitled) ---"));
    }

    #[test]
    fn test_snippet_truncates_on_char_boundary() {
        assert_eq!(snippet("short", 10), "short");
        assert_eq!(snippet("abcdef", 3), "abc...");
        // Multi-byte characters are kept whole
        assert_eq!(snippet("ééééé", 2), "éé...");
    }

    #[test]
    fn test_write_json_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");

        write_json(&[sample_site()], &path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed[0]["seed_url"], "https://acme.com/");
        assert_eq!(parsed[0]["pages"][0]["title"], "Acme Corp");
        assert_eq!(parsed[0]["documents"][0]["format"], "PDF");
        assert_eq!(
            parsed[0]["documents"][0]["extracted_text"],
            "Load   limit:  5t"
        );
    }
}
