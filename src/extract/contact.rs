//! Contact-identifier extraction from page text
//!
//! Emails and phone numbers are pulled from the full visible text of a page
//! with fixed patterns. Both produce deduplicated, sorted sets.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").expect("valid regex")
});

/// Loose candidate shape; real filtering happens in [`plausible_phone`]
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+?\d[\d\s().\-/]{6,18}\d").expect("valid regex")
});

/// Calendar dates share the digit-and-separator shape of phone numbers.
/// One alternative per separator; mixed separators are not a date.
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\d{1,4}-\d{1,2}-\d{1,4}$|^\d{1,4}/\d{1,2}/\d{1,4}$|^\d{1,4}\.\d{1,2}\.\d{1,4}$",
    )
    .expect("valid regex")
});

/// Extracts email addresses, lowercased and deduplicated
pub fn extract_emails(text: &str) -> BTreeSet<String> {
    EMAIL_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Extracts phone numbers, deduplicated
///
/// Candidates keep their written form (separators included); anything with
/// too few or too many digits, or shaped like a calendar date, is dropped.
pub fn extract_phones(text: &str) -> BTreeSet<String> {
    PHONE_RE
        .find_iter(text)
        .map(|m| m.as_str().trim().to_string())
        .filter(|candidate| plausible_phone(candidate))
        .collect()
}

fn plausible_phone(candidate: &str) -> bool {
    let digits = candidate.chars().filter(|c| c.is_ascii_digit()).count();
    if !(7..=15).contains(&digits) {
        return false;
    }
    !DATE_RE.is_match(candidate)
}
