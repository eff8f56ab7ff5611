//! Output module for presenting research results
//!
//! This module handles:
//! - Cleaning narrative and document text for human-facing output
//! - Rendering the sectioned terminal report
//! - Exporting full results as JSON

mod cleanup;
mod report;

pub use cleanup::clean_text;
pub use report::{format_report, write_json};
