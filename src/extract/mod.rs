//! Content extraction
//!
//! Pure functions that turn fetched HTML into structured [`PageRecord`]s.
//! Nothing in this module performs I/O, which keeps extraction trivially
//! testable against string fixtures.

pub mod contact;
pub mod page;

pub use contact::{extract_emails, extract_phones};
pub use page::{extract_page, ImageRef, PageRecord};
