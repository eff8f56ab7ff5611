//! URL handling module for dossier
//!
//! This module provides URL normalization (the identity form used by the
//! visited/queued sets) and registrable-domain extraction (the unit of crawl
//! scoping).

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{in_scope, registrable_domain};
pub use normalize::normalize_url;
