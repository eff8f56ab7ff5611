//! Configuration module for dossier
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Every field has a default, so running without a file works.
//!
//! # Example
//!
//! ```no_run
//! use dossier::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawler will fetch at most {} pages", config.crawler.max_pages);
//! ```

mod parser;
mod types;
pub(crate) mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, DocumentsConfig, HttpConfig, SeedsConfig, ServerConfig,
};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default};
