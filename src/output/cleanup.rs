//! Text cleanup for human-facing output
//!
//! Narrative and document text arrives with whatever spacing and stray
//! markup the source page carried. [`clean_text`] flattens it into a single
//! readable line; structured fields (headings, tables, lists) are already
//! element-scoped and are left alone.

use regex::Regex;
use std::sync::LazyLock;

/// Emphasis markers and code ticks that survive text extraction
static MARKUP_ARTIFACTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[*`]+").expect("valid regex"));

static WHITESPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Strips markup artifacts and collapses whitespace runs to single spaces
///
/// # Example
///
/// ```
/// use dossier::output::clean_text;
///
/// let cleaned = clean_text("  **Acme**  makes\n\n`anvils`  ");
/// assert_eq!(cleaned, "Acme makes anvils");
/// ```
pub fn clean_text(text: &str) -> String {
    let stripped = MARKUP_ARTIFACTS.replace_all(text, "");
    let collapsed = WHITESPACE_RUNS.replace_all(&stripped, " ");
    collapsed.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace_runs() {
        assert_eq!(clean_text("a  b\t\tc\n\nd"), "a b c d");
    }

    #[test]
    fn test_strips_markup_artifacts() {
        assert_eq!(clean_text("**bold** and `code` and *em*"), "bold and code and em");
    }

    #[test]
    fn test_trims_edges() {
        assert_eq!(clean_text("   padded   "), "padded");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text("   \n\t  "), "");
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(clean_text("already clean"), "already clean");
    }
}
