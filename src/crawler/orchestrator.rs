//! Research orchestration
//!
//! Ties the per-seed pieces together: validates the seed list, crawls each
//! site, gathers the document links the pages surfaced, and downloads them
//! through the retriever pool. Produces one [`SiteResult`] per seed, in
//! seed order.

use crate::config::Config;
use crate::crawler::coordinator::Crawler;
use crate::crawler::fetcher::{build_http_client, Fetcher};
use crate::crawler::frontier::CrawlJob;
use crate::documents::{DocumentRecord, DocumentRetriever};
use crate::extract::PageRecord;
use crate::{DossierError, Result};
use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use url::Url;

/// Everything learned about one seed URL
#[derive(Debug, Clone, Serialize)]
pub struct SiteResult {
    /// The seed this result was crawled from
    pub seed_url: Url,
    /// Extracted pages, in fetch completion order
    pub pages: Vec<PageRecord>,
    /// Downloaded documents, in URL order
    pub documents: Vec<DocumentRecord>,
}

/// Runs full research passes over lists of seed URLs
pub struct Orchestrator {
    config: Config,
    crawler: Crawler,
    retriever: DocumentRetriever,
}

impl Orchestrator {
    /// Builds the shared HTTP client and both worker pools
    pub fn new(config: Config) -> Result<Self> {
        let client = build_http_client(&config.http)?;
        let fetcher = Fetcher::new(client.clone(), &config.crawler);
        let crawler = Crawler::new(fetcher, config.crawler.clone());
        let retriever = DocumentRetriever::new(client, &config.documents);

        Ok(Orchestrator {
            config,
            crawler,
            retriever,
        })
    }

    /// Researches every seed URL, one site at a time
    ///
    /// Fails before any network traffic if the seed list is empty or any
    /// seed has no usable host. Per-site trouble after that point (dead
    /// servers, broken pages, failed downloads) is absorbed into the
    /// results rather than raised.
    pub async fn research(&self, seed_urls: &[Url]) -> Result<Vec<SiteResult>> {
        self.research_with_cancel(seed_urls, None).await
    }

    /// Researches every seed URL, honoring a cancellation flag
    ///
    /// When `cancel` flips true the current site finishes its in-flight
    /// batch, pending sites are dropped, and the results collected so far
    /// are returned.
    pub async fn research_with_cancel(
        &self,
        seed_urls: &[Url],
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<Vec<SiteResult>> {
        if seed_urls.is_empty() {
            return Err(DossierError::EmptySeedList);
        }

        // Validate every seed before any network work
        let mut jobs = Vec::with_capacity(seed_urls.len());
        for seed in seed_urls {
            jobs.push(CrawlJob::new(seed.clone(), &self.config.crawler)?);
        }

        tracing::info!(seeds = jobs.len(), "Starting research run");

        let mut results = Vec::with_capacity(jobs.len());
        for job in jobs {
            if is_cancelled(&cancel) {
                tracing::info!(completed = results.len(), "Research cancelled");
                break;
            }
            results.push(self.research_site(job, cancel.clone()).await);
        }

        tracing::info!(sites = results.len(), "Research run finished");
        Ok(results)
    }

    /// Crawls one site and downloads the documents its pages link to
    async fn research_site(&self, job: CrawlJob, cancel: Option<Arc<AtomicBool>>) -> SiteResult {
        let seed_url = job.start_url.clone();
        let pages = self.crawler.crawl_with_cancel(&job, cancel.clone()).await;

        // Union of document links across pages, ordered so download
        // dispatch and output are deterministic
        let document_urls: BTreeSet<Url> = pages
            .iter()
            .flat_map(|page| page.document_links.iter().cloned())
            .collect();

        if !document_urls.is_empty() {
            tracing::info!(
                seed_url = %seed_url,
                documents = document_urls.len(),
                "Retrieving linked documents"
            );
        }

        let urls: Vec<&Url> = document_urls.iter().collect();
        let mut documents = Vec::with_capacity(urls.len());
        for batch in urls.chunks(self.config.documents.max_concurrent_downloads.max(1)) {
            if is_cancelled(&cancel) {
                tracing::info!(retrieved = documents.len(), "Document retrieval cancelled");
                break;
            }
            let retrieved = join_all(batch.iter().map(|url| self.retriever.retrieve(url))).await;
            documents.extend(retrieved);
        }

        tracing::info!(
            seed_url = %seed_url,
            pages = pages.len(),
            documents = documents.len(),
            "Site research finished"
        );

        SiteResult {
            seed_url,
            pages,
            documents,
        }
    }
}

fn is_cancelled(cancel: &Option<Arc<AtomicBool>>) -> bool {
    cancel
        .as_ref()
        .map(|flag| flag.load(Ordering::Relaxed))
        .unwrap_or(false)
}

/// Researches a list of seed URLs with a one-shot orchestrator
///
/// # Example
///
/// ```no_run
/// use dossier::config::Config;
/// use dossier::crawler::research;
/// use url::Url;
///
/// # async fn example() -> dossier::Result<()> {
/// let seeds = vec![Url::parse("https://acme.com").unwrap()];
/// let results = research(&seeds, Config::default()).await?;
/// for site in &results {
///     println!("{}: {} pages", site.seed_url, site.pages.len());
/// }
/// # Ok(())
/// # }
/// ```
pub async fn research(seed_urls: &[Url], config: Config) -> Result<Vec<SiteResult>> {
    let orchestrator = Orchestrator::new(config)?;
    orchestrator.research(seed_urls).await
}
