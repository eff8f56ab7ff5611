//! HTTP fetching
//!
//! This module owns all page-level HTTP traffic for the crawler:
//! - Building the shared HTTP client with browser-like headers
//! - Bounded-concurrency GET requests with per-request timeouts
//! - Content-Type gating (only HTML reaches extraction)
//! - Failure classification
//!
//! A fetch never raises: every failure is folded into the returned
//! [`FetchOutcome`] so the crawl loop can log it and move on.

use crate::config::{CrawlerConfig, HttpConfig};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use url::Url;

/// Result of fetching one page
#[derive(Debug)]
pub enum FetchOutcome {
    /// The server returned an HTML page
    Success {
        /// URL after following redirects
        final_url: Url,
        /// HTTP status code
        status: u16,
        /// Content-Type header value
        content_type: String,
        /// Response body
        body: String,
    },

    /// The fetch produced no usable page
    Failure(FetchFailure),
}

/// Why a fetch produced no page
#[derive(Debug, Error)]
pub enum FetchFailure {
    /// The request exceeded the configured per-fetch timeout
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The server answered with a non-2xx status
    #[error("server returned HTTP {0}")]
    HttpStatus(u16),

    /// The response is not an HTML document
    #[error("expected HTML, got {0:?}")]
    NonHtml(String),

    /// Connection, TLS, or protocol level failure
    #[error("transport error: {0}")]
    Transport(String),
}

/// Builds the HTTP client shared by page fetches and document downloads
///
/// The client masquerades as a desktop browser (configurable User-Agent
/// plus Accept/Accept-Language defaults) because plenty of company sites
/// serve bot-flagged clients an empty shell. Redirects are followed up to
/// ten hops; compression is negotiated transparently.
///
/// # Example
///
/// ```no_run
/// use dossier::config::HttpConfig;
/// use dossier::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    // Validated as ASCII by the config layer; skip silently if not
    if let Ok(value) = HeaderValue::from_str(&config.accept_language) {
        headers.insert(ACCEPT_LANGUAGE, value);
    }

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Issues page fetches through a shared bounded-concurrency pool
///
/// Cloning is cheap and shares the pool: every clone draws permits from
/// the same semaphore, so at most `max-concurrent-fetches` requests are in
/// flight per crawl job no matter how many tasks hold a handle.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    semaphore: Arc<Semaphore>,
    timeout: Duration,
}

impl Fetcher {
    /// Creates a fetcher drawing limits from the crawler configuration
    pub fn new(client: Client, config: &CrawlerConfig) -> Self {
        Fetcher {
            client,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent_fetches)),
            timeout: Duration::from_secs(config.fetch_timeout_secs),
        }
    }

    /// Fetches one URL, classifying every failure instead of raising
    pub async fn fetch(&self, url: &Url) -> FetchOutcome {
        let _permit = match self.semaphore.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                return FetchOutcome::Failure(FetchFailure::Transport(
                    "fetch pool closed".to_string(),
                ));
            }
        };

        tracing::debug!(url = %url, "Fetching page");

        let response = match self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => return FetchOutcome::Failure(self.classify(err)),
        };

        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            return FetchOutcome::Failure(FetchFailure::HttpStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_html_content_type(&content_type) {
            return FetchOutcome::Failure(FetchFailure::NonHtml(content_type));
        }

        match response.text().await {
            Ok(body) => FetchOutcome::Success {
                final_url,
                status: status.as_u16(),
                content_type,
                body,
            },
            Err(err) => FetchOutcome::Failure(self.classify(err)),
        }
    }

    fn classify(&self, err: reqwest::Error) -> FetchFailure {
        if err.is_timeout() {
            FetchFailure::Timeout(self.timeout)
        } else {
            FetchFailure::Transport(err.to_string())
        }
    }
}

/// HTML means `text/html` or `application/xhtml+xml`; parameters like
/// charset are ignored
fn is_html_content_type(content_type: &str) -> bool {
    let lower = content_type.to_ascii_lowercase();
    lower.starts_with("text/html") || lower.starts_with("application/xhtml+xml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher_with_timeout(timeout_secs: u64) -> Fetcher {
        let config = CrawlerConfig {
            fetch_timeout_secs: timeout_secs,
            ..CrawlerConfig::default()
        };
        let client = build_http_client(&HttpConfig::default()).unwrap();
        Fetcher::new(client, &config)
    }

    fn fetcher() -> Fetcher {
        fetcher_with_timeout(10)
    }

    #[test]
    fn test_is_html_content_type() {
        assert!(is_html_content_type("text/html"));
        assert!(is_html_content_type("text/html; charset=utf-8"));
        assert!(is_html_content_type("TEXT/HTML"));
        assert!(is_html_content_type("application/xhtml+xml"));
        assert!(!is_html_content_type("application/json"));
        assert!(!is_html_content_type("application/pdf"));
        assert!(!is_html_content_type(""));
    }

    #[tokio::test]
    async fn test_fetch_html_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/about"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<title>About</title>", "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/about", server.uri())).unwrap();
        match fetcher().fetch(&url).await {
            FetchOutcome::Success {
                status,
                content_type,
                body,
                final_url,
            } => {
                assert_eq!(status, 200);
                assert!(content_type.starts_with("text/html"));
                assert_eq!(body, "<title>About</title>");
                assert_eq!(final_url, url);
            }
            FetchOutcome::Failure(failure) => panic!("expected success, got {failure}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_follows_redirects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<p>moved</p>", "text/html"))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/old", server.uri())).unwrap();
        match fetcher().fetch(&url).await {
            FetchOutcome::Success { final_url, .. } => assert_eq!(final_url.path(), "/new"),
            FetchOutcome::Failure(failure) => panic!("expected success, got {failure}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_classifies_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/gone", server.uri())).unwrap();
        match fetcher().fetch(&url).await {
            FetchOutcome::Failure(FetchFailure::HttpStatus(status)) => assert_eq!(status, 404),
            other => panic!("expected http status failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_html() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data.json"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/data.json", server.uri())).unwrap();
        match fetcher().fetch(&url).await {
            FetchOutcome::Failure(FetchFailure::NonHtml(content_type)) => {
                assert_eq!(content_type, "application/json");
            }
            other => panic!("expected non-html failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_rejects_missing_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/mystery"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/mystery", server.uri())).unwrap();
        match fetcher().fetch(&url).await {
            FetchOutcome::Failure(FetchFailure::NonHtml(content_type)) => {
                assert_eq!(content_type, "");
            }
            other => panic!("expected non-html failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<p>late</p>", "text/html")
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/slow", server.uri())).unwrap();
        match fetcher_with_timeout(1).fetch(&url).await {
            FetchOutcome::Failure(FetchFailure::Timeout(_)) => {}
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_classifies_connection_failure() {
        // Nothing listens on this port
        let url = Url::parse("http://127.0.0.1:9/unreachable").unwrap();
        match fetcher().fetch(&url).await {
            FetchOutcome::Failure(FetchFailure::Transport(_)) => {}
            other => panic!("expected transport failure, got {other:?}"),
        }
    }
}
