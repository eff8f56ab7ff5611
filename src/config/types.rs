use serde::Deserialize;

/// Main configuration structure for dossier
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub http: HttpConfig,
    pub documents: DocumentsConfig,
    pub seeds: SeedsConfig,
    pub server: ServerConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of pages fetched (or attempted) per seed
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Maximum link depth from the seed URL
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of concurrent page fetches per crawl job
    #[serde(rename = "max-concurrent-fetches")]
    pub max_concurrent_fetches: usize,

    /// Per-request timeout in seconds
    #[serde(rename = "fetch-timeout-secs")]
    pub fetch_timeout_secs: u64,

    /// Wall-clock budget for one crawl job in seconds; 0 disables the deadline
    #[serde(rename = "job-deadline-secs")]
    pub job_deadline_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 30,
            max_depth: 2,
            max_concurrent_fetches: 10,
            fetch_timeout_secs: 20,
            job_deadline_secs: 0,
        }
    }
}

/// HTTP client identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Accept-Language header sent with every request
    #[serde(rename = "accept-language")]
    pub accept_language: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            // Sites that gate on UA serve browsers the full page; a
            // self-identifying crawler UA gets blocked or a stub.
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                         AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/96.0.4664.110 Safari/537.36"
                .to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
        }
    }
}

/// Document download configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DocumentsConfig {
    /// Directory downloaded documents are written into
    #[serde(rename = "download-dir")]
    pub download_dir: String,

    /// Maximum number of concurrent document downloads per research run
    #[serde(rename = "max-concurrent-downloads")]
    pub max_concurrent_downloads: usize,

    /// Per-download timeout in seconds
    #[serde(rename = "download-timeout-secs")]
    pub download_timeout_secs: u64,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            download_dir: "downloads".to_string(),
            max_concurrent_downloads: 5,
            download_timeout_secs: 30,
        }
    }
}

/// Seed generation configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SeedsConfig {
    /// Cap on the number of seed URLs generated from a query
    #[serde(rename = "max-urls")]
    pub max_urls: usize,
}

impl Default for SeedsConfig {
    fn default() -> Self {
        Self { max_urls: 20 }
    }
}

/// HTTP service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the service binds to
    #[serde(rename = "bind-addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
        }
    }
}
