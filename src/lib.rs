//! Dossier: company research by bounded web crawling
//!
//! This crate seeds candidate URLs for a named company, crawls each site
//! breadth-first within page/depth bounds, extracts structured content from
//! every page, downloads linked documents (PDF/DOCX/XLSX/PPTX/TXT), and
//! assembles one [`SiteResult`] per seed.

pub mod config;
pub mod crawler;
pub mod documents;
pub mod extract;
pub mod output;
pub mod seed;
pub mod server;
pub mod url;

use thiserror::Error;

/// Main error type for dossier operations
#[derive(Debug, Error)]
pub enum DossierError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No seed URLs to research")]
    EmptySeedList,

    #[error("Seed URL has no host: {0}")]
    SeedWithoutHost(String),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for dossier operations
pub type Result<T> = std::result::Result<T, DossierError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{research, CrawlJob, Orchestrator, SiteResult};
pub use documents::{DocumentFormat, DocumentRecord};
pub use extract::PageRecord;
pub use url::{normalize_url, registrable_domain};
