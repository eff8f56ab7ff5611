//! Structured page-content extraction
//!
//! This module turns fetched HTML into a [`PageRecord`]:
//! - Title, meta description, headings, paragraphs, tables, lists, images
//! - Emails and phone numbers from the full visible text
//! - All absolute links, with document links (PDF/DOCX/XLSX/PPTX/TXT)
//!   classified into their own set
//! - A narrative text field chosen by a priority chain over the markup

use crate::documents::DocumentFormat;
use crate::extract::contact::{extract_emails, extract_phones};
use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node, Selector};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use url::Url;

/// Class-attribute keywords that mark an element as main content when the
/// page has no semantic `<article>`/`<main>` element
const CONTENT_CLASS_KEYWORDS: &[&str] = &["content", "main", "article", "body"];

/// An image reference found on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    /// Absolute image URL
    pub src: String,
    /// Alternative text, empty when the attribute is missing
    pub alt: String,
}

/// Structured content of one successfully fetched page
///
/// Created once per page and never mutated afterwards. Set-valued fields are
/// ordered so serialized output is deterministic.
#[derive(Debug, Clone, Serialize)]
pub struct PageRecord {
    /// The URL the crawler requested
    pub url: Url,
    /// `<title>` text, empty when absent
    pub title: String,
    /// `<meta name="description">` content, empty when absent
    pub meta_description: String,
    /// Heading texts keyed `"h1"`..`"h6"`; only levels present on the page
    pub headings: BTreeMap<String, Vec<String>>,
    /// `<p>` texts in document order
    pub paragraphs: Vec<String>,
    /// Tables as row-major cell text (`th` and `td` both count as cells)
    pub tables: Vec<Vec<Vec<String>>>,
    /// `<ul>`/`<ol>` item texts in document order
    pub lists: Vec<Vec<String>>,
    /// Image references in document order
    pub images: Vec<ImageRef>,
    /// Email addresses found in the visible text
    pub emails: BTreeSet<String>,
    /// Phone numbers found in the visible text
    pub phones: BTreeSet<String>,
    /// Every absolute http(s) link on the page
    pub links: BTreeSet<Url>,
    /// The subset of links pointing at supported document formats
    pub document_links: BTreeSet<Url>,
    /// Narrative text for summary consumers (see [`extract_page`])
    pub text: String,
}

/// Extracts a [`PageRecord`] from raw HTML
///
/// Deterministic and pure with respect to the markup. The narrative `text`
/// field is chosen by priority: the first non-empty `<article>`/`<main>`
/// element; else all `<div>`/`<section>` elements whose class names contain
/// a content keyword; else the concatenated paragraphs; else the full
/// visible text. All other fields are extracted unconditionally. "Visible
/// text" excludes `<script>`, `<style>`, and `<noscript>` subtrees.
///
/// # Arguments
///
/// * `html` - The page markup
/// * `url` - The URL the page was fetched from, used to resolve relative
///   links and image sources
///
/// # Example
///
/// ```
/// use dossier::extract::extract_page;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/about").unwrap();
/// let record = extract_page("<title>About</title><p>We build robots.</p>", &url);
/// assert_eq!(record.title, "About");
/// assert_eq!(record.paragraphs, vec!["We build robots.".to_string()]);
/// ```
pub fn extract_page(html: &str, url: &Url) -> PageRecord {
    let document = Html::parse_document(html);

    let visible = visible_text(&document);
    let paragraphs = extract_paragraphs(&document).unwrap_or_default();
    let (links, document_links) = extract_links(&document, url);
    let text = extract_narrative(&document, &paragraphs, &visible);

    PageRecord {
        url: url.clone(),
        title: extract_title(&document).unwrap_or_default(),
        meta_description: extract_meta_description(&document).unwrap_or_default(),
        headings: extract_headings(&document),
        paragraphs,
        tables: extract_tables(&document).unwrap_or_default(),
        lists: extract_lists(&document).unwrap_or_default(),
        images: extract_images(&document, url).unwrap_or_default(),
        emails: extract_emails(&visible),
        phones: extract_phones(&visible),
        links,
        document_links,
        text,
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| normalize_ws(&element.text().collect::<String>()))
        .filter(|title| !title.is_empty())
}

/// Extracts the meta description from the HTML document
fn extract_meta_description(document: &Html) -> Option<String> {
    let selector = Selector::parse(r#"meta[name="description"]"#).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(normalize_ws)
        .filter(|description| !description.is_empty())
}

/// Extracts heading texts, grouped by level
fn extract_headings(document: &Html) -> BTreeMap<String, Vec<String>> {
    let mut headings = BTreeMap::new();

    for level in 1..=6u8 {
        let tag = format!("h{}", level);
        let selector = match Selector::parse(&tag) {
            Ok(selector) => selector,
            Err(_) => continue,
        };
        let texts: Vec<String> = document
            .select(&selector)
            .map(|element| normalize_ws(&element.text().collect::<String>()))
            .filter(|text| !text.is_empty())
            .collect();
        if !texts.is_empty() {
            headings.insert(tag, texts);
        }
    }

    headings
}

/// Extracts paragraph texts in document order
fn extract_paragraphs(document: &Html) -> Option<Vec<String>> {
    let selector = Selector::parse("p").ok()?;
    Some(
        document
            .select(&selector)
            .map(|element| normalize_ws(&element.text().collect::<String>()))
            .filter(|text| !text.is_empty())
            .collect(),
    )
}

/// Extracts tables as row-major cell text
///
/// Rows without any `th`/`td` cells are skipped; empty cells are kept as
/// empty strings so column positions survive.
fn extract_tables(document: &Html) -> Option<Vec<Vec<Vec<String>>>> {
    let table_selector = Selector::parse("table").ok()?;
    let row_selector = Selector::parse("tr").ok()?;
    let cell_selector = Selector::parse("th, td").ok()?;

    let mut tables = Vec::new();
    for table in document.select(&table_selector) {
        let mut rows = Vec::new();
        for row in table.select(&row_selector) {
            let cells: Vec<String> = row
                .select(&cell_selector)
                .map(|cell| normalize_ws(&cell.text().collect::<String>()))
                .collect();
            if !cells.is_empty() {
                rows.push(cells);
            }
        }
        if !rows.is_empty() {
            tables.push(rows);
        }
    }

    Some(tables)
}

/// Extracts `<ul>`/`<ol>` lists as item texts
fn extract_lists(document: &Html) -> Option<Vec<Vec<String>>> {
    let list_selector = Selector::parse("ul, ol").ok()?;
    let item_selector = Selector::parse("li").ok()?;

    let mut lists = Vec::new();
    for list in document.select(&list_selector) {
        let items: Vec<String> = list
            .select(&item_selector)
            .map(|item| normalize_ws(&item.text().collect::<String>()))
            .filter(|text| !text.is_empty())
            .collect();
        if !items.is_empty() {
            lists.push(items);
        }
    }

    Some(lists)
}

/// Extracts image references, resolving sources against the page URL
///
/// Images without a usable `src` and inline `data:` images are skipped.
fn extract_images(document: &Html, base_url: &Url) -> Option<Vec<ImageRef>> {
    let selector = Selector::parse("img[src]").ok()?;

    let mut images = Vec::new();
    for element in document.select(&selector) {
        let src = element.value().attr("src").unwrap_or("").trim();
        if src.is_empty() || src.starts_with("data:") {
            continue;
        }
        let resolved = match base_url.join(src) {
            Ok(resolved) => resolved,
            Err(_) => continue,
        };
        images.push(ImageRef {
            src: resolved.to_string(),
            alt: element.value().attr("alt").unwrap_or("").trim().to_string(),
        });
    }

    Some(images)
}

/// Extracts all links, splitting out those that point at documents
fn extract_links(document: &Html, base_url: &Url) -> (BTreeSet<Url>, BTreeSet<Url>) {
    let mut links = BTreeSet::new();
    let mut document_links = BTreeSet::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(resolved) = resolve_link(href, base_url) {
                    if DocumentFormat::from_url(&resolved).is_some() {
                        document_links.insert(resolved.clone());
                    }
                    links.insert(resolved);
                }
            }
        }
    }

    (links, document_links)
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None for empty hrefs, bare fragments, `javascript:`/`mailto:`/
/// `tel:`/`data:` targets, and anything that does not resolve to http(s).
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    match absolute.scheme() {
        "http" | "https" => Some(absolute),
        _ => None,
    }
}

/// Chooses the narrative text by the priority chain
fn extract_narrative(document: &Html, paragraphs: &[String], visible: &str) -> String {
    // Branch 1: first semantic content element with any text
    if let Ok(selector) = Selector::parse("article, main") {
        if let Some(text) = document
            .select(&selector)
            .map(element_visible_text)
            .find(|text| !text.is_empty())
        {
            return text;
        }
    }

    // Branch 2: elements whose class names look like content containers
    if let Ok(selector) = Selector::parse("div, section") {
        let chunks: Vec<String> = document
            .select(&selector)
            .filter(has_content_class)
            .map(element_visible_text)
            .filter(|text| !text.is_empty())
            .collect();
        if !chunks.is_empty() {
            return chunks.join("\n\n");
        }
    }

    // Branch 3: all paragraph text
    if !paragraphs.is_empty() {
        return paragraphs.join("\n\n");
    }

    // Branch 4: whatever the page shows
    visible.to_string()
}

fn has_content_class(element: &ElementRef) -> bool {
    let class = match element.value().attr("class") {
        Some(class) => class.to_lowercase(),
        None => return false,
    };
    CONTENT_CLASS_KEYWORDS
        .iter()
        .any(|keyword| class.contains(keyword))
}

/// Visible text of the whole document
fn visible_text(document: &Html) -> String {
    let mut out = String::new();
    collect_visible_text(document.tree.root(), &mut out);
    normalize_ws(&out)
}

/// Visible text of one element's subtree
fn element_visible_text(element: ElementRef) -> String {
    let mut out = String::new();
    collect_visible_text(*element, &mut out);
    normalize_ws(&out)
}

/// Collects text nodes outside script/style/noscript subtrees
fn collect_visible_text(root: NodeRef<'_, Node>, out: &mut String) {
    for node in root.descendants() {
        if let Some(text) = node.value().as_text() {
            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .map(|element| matches!(element.name(), "script" | "style" | "noscript"))
                    .unwrap_or(false)
            });
            if !hidden {
                out.push_str(text);
                out.push(' ');
            }
        }
    }
}

/// Collapses whitespace runs to single spaces and trims
fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("https://acme.com/about").unwrap()
    }

    #[test]
    fn test_title_and_meta_description() {
        let html = r#"<html><head>
            <title>  Acme | About  </title>
            <meta name="description" content="Robots for everyone.">
        </head><body></body></html>"#;
        let record = extract_page(html, &page_url());
        assert_eq!(record.title, "Acme | About");
        assert_eq!(record.meta_description, "Robots for everyone.");
    }

    #[test]
    fn test_missing_title_and_description_are_empty() {
        let record = extract_page("<html><body><p>x</p></body></html>", &page_url());
        assert_eq!(record.title, "");
        assert_eq!(record.meta_description, "");
    }

    #[test]
    fn test_headings_grouped_by_level() {
        let html = r#"
            <h1>Acme</h1>
            <h2>Team</h2>
            <h2>History</h2>
            <h4>Founding</h4>
        "#;
        let record = extract_page(html, &page_url());
        assert_eq!(record.headings["h1"], vec!["Acme"]);
        assert_eq!(record.headings["h2"], vec!["Team", "History"]);
        assert_eq!(record.headings["h4"], vec!["Founding"]);
        assert!(!record.headings.contains_key("h3"));
        assert!(!record.headings.contains_key("h6"));
    }

    #[test]
    fn test_paragraphs_in_document_order() {
        let html = "<p>First.</p><div><p>Second.</p></div><p>   </p><p>Third.</p>";
        let record = extract_page(html, &page_url());
        assert_eq!(record.paragraphs, vec!["First.", "Second.", "Third."]);
    }

    #[test]
    fn test_table_cells_row_major() {
        let html = r#"
            <table>
                <tr><th>Year</th><th>Revenue</th></tr>
                <tr><td>2023</td><td></td></tr>
            </table>
        "#;
        let record = extract_page(html, &page_url());
        assert_eq!(record.tables.len(), 1);
        assert_eq!(record.tables[0][0], vec!["Year", "Revenue"]);
        // Blank cell survives as an empty string so columns line up
        assert_eq!(record.tables[0][1], vec!["2023", ""]);
    }

    #[test]
    fn test_unordered_and_ordered_lists() {
        let html = r#"
            <ul><li>Alpha</li><li>Beta</li></ul>
            <ol><li>One</li><li>Two</li></ol>
        "#;
        let record = extract_page(html, &page_url());
        assert_eq!(record.lists.len(), 2);
        assert_eq!(record.lists[0], vec!["Alpha", "Beta"]);
        assert_eq!(record.lists[1], vec!["One", "Two"]);
    }

    #[test]
    fn test_images_resolved_with_default_alt() {
        let html = r#"
            <img src="/logo.png" alt="Acme logo">
            <img src="hero.jpg">
            <img src="data:image/png;base64,AAAA">
            <img src="">
        "#;
        let record = extract_page(html, &page_url());
        assert_eq!(
            record.images,
            vec![
                ImageRef {
                    src: "https://acme.com/logo.png".to_string(),
                    alt: "Acme logo".to_string(),
                },
                ImageRef {
                    src: "https://acme.com/hero.jpg".to_string(),
                    alt: String::new(),
                },
            ]
        );
    }

    #[test]
    fn test_links_are_absolute_and_deduplicated() {
        let html = r#"
            <a href="/team">Team</a>
            <a href="/team">Team again</a>
            <a href="https://partner.example/about">Partner</a>
        "#;
        let record = extract_page(html, &page_url());
        assert_eq!(record.links.len(), 2);
        assert!(record
            .links
            .contains(&Url::parse("https://acme.com/team").unwrap()));
        assert!(record
            .links
            .contains(&Url::parse("https://partner.example/about").unwrap()));
    }

    #[test]
    fn test_special_scheme_links_skipped() {
        let html = r##"
            <a href="javascript:void(0)">JS</a>
            <a href="mailto:info@acme.com">Mail</a>
            <a href="tel:+15551234567">Call</a>
            <a href="data:text/html,x">Data</a>
            <a href="#section">Anchor</a>
            <a href="   ">Blank</a>
        "##;
        let record = extract_page(html, &page_url());
        assert!(record.links.is_empty());
    }

    #[test]
    fn test_document_links_classified() {
        let html = r#"
            <a href="/docs/report.pdf">Annual report</a>
            <a href="/docs/DECK.PPTX">Deck</a>
            <a href="/data/numbers.xlsx?rev=2">Numbers</a>
            <a href="notes.txt">Notes</a>
            <a href="/handbook.docx">Handbook</a>
            <a href="/archive.zip">Archive</a>
            <a href="/team">Team</a>
        "#;
        let record = extract_page(html, &page_url());

        let document_paths: Vec<&str> = record
            .document_links
            .iter()
            .map(|url| url.path())
            .collect();
        assert_eq!(record.document_links.len(), 5);
        assert!(document_paths.contains(&"/docs/report.pdf"));
        assert!(document_paths.contains(&"/docs/DECK.PPTX"));
        assert!(document_paths.contains(&"/data/numbers.xlsx"));
        assert!(document_paths.contains(&"/notes.txt"));
        assert!(document_paths.contains(&"/handbook.docx"));

        // Document links stay in the general link set too
        for link in &record.document_links {
            assert!(record.links.contains(link));
        }
        assert!(!document_paths.contains(&"/archive.zip"));
    }

    #[test]
    fn test_emails_and_phones_from_visible_text() {
        let html = r#"
            <footer>Contact info@acme.com or call +1 (555) 123-4567</footer>
            <script>var tracker = "spy@analytics.example";</script>
            <style>.hidden::after { content: "fake@style.example"; }</style>
        "#;
        let record = extract_page(html, &page_url());
        assert_eq!(record.emails.len(), 1);
        assert!(record.emails.contains("info@acme.com"));
        assert_eq!(record.phones.len(), 1);
        assert!(record.phones.contains("+1 (555) 123-4567"));
    }

    #[test]
    fn test_narrative_prefers_article() {
        let html = r#"
            <div class="content">Sidebar noise</div>
            <article>Acme builds robots since 2001.</article>
            <p>Paragraph elsewhere.</p>
        "#;
        let record = extract_page(html, &page_url());
        assert_eq!(record.text, "Acme builds robots since 2001.");
    }

    #[test]
    fn test_narrative_main_counts_as_semantic() {
        let html = "<main>Main block text.</main><p>Other.</p>";
        let record = extract_page(html, &page_url());
        assert_eq!(record.text, "Main block text.");
    }

    #[test]
    fn test_narrative_falls_back_to_content_classes() {
        let html = r#"
            <div class="page-content">First block.</div>
            <section class="MainSection">Second block.</section>
            <div class="nav">Skip me.</div>
        "#;
        let record = extract_page(html, &page_url());
        assert_eq!(record.text, "First block.\n\nSecond block.");
    }

    #[test]
    fn test_narrative_falls_back_to_paragraphs() {
        let html = "<p>Alpha.</p><p>Beta.</p>";
        let record = extract_page(html, &page_url());
        assert_eq!(record.text, "Alpha.\n\nBeta.");
    }

    #[test]
    fn test_narrative_falls_back_to_visible_text() {
        let html = "<span>Just</span> <span>spans</span><script>ignored()</script>";
        let record = extract_page(html, &page_url());
        assert_eq!(record.text, "Just spans");
    }

    #[test]
    fn test_empty_article_does_not_shadow_later_branches() {
        let html = "<article>   </article><p>Real text.</p>";
        let record = extract_page(html, &page_url());
        assert_eq!(record.text, "Real text.");
    }

    #[test]
    fn test_record_url_is_request_url() {
        let record = extract_page("<p>x</p>", &page_url());
        assert_eq!(record.url, page_url());
    }
}
