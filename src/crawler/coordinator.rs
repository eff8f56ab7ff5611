//! Crawl coordination
//!
//! Drives one site crawl from seed to completion: drains the frontier one
//! depth level at a time, fans each batch out over the fetch pool, feeds
//! successful pages through extraction, and queues the in-scope links they
//! reveal. Failed fetches are logged and skipped; the page budget still
//! charges them as attempts.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{FetchOutcome, Fetcher};
use crate::crawler::frontier::{CrawlJob, Frontier};
use crate::extract::{extract_page, PageRecord};
use crate::url::in_scope;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;

/// How often an in-flight batch re-checks the cancel flag and deadline
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Breadth-first crawler for a single site
pub struct Crawler {
    fetcher: Fetcher,
    config: CrawlerConfig,
}

impl Crawler {
    pub fn new(fetcher: Fetcher, config: CrawlerConfig) -> Self {
        Crawler { fetcher, config }
    }

    /// Crawls one site to completion
    ///
    /// Returns the extracted pages in the order their fetches finished.
    /// Never fails: a site where every fetch dies yields an empty list.
    pub async fn crawl(&self, job: &CrawlJob) -> Vec<PageRecord> {
        self.crawl_with_cancel(job, None).await
    }

    /// Crawls one site, stopping early when `cancel` flips true or the
    /// configured job deadline passes
    ///
    /// A stop aborts the in-flight fetches; pages collected before it are
    /// returned.
    pub async fn crawl_with_cancel(
        &self,
        job: &CrawlJob,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Vec<PageRecord> {
        let mut frontier = Frontier::new(job);
        let mut records: Vec<PageRecord> = Vec::new();
        let start_time = std::time::Instant::now();

        let deadline = match self.config.job_deadline_secs {
            0 => None,
            secs => Some(Instant::now() + Duration::from_secs(secs)),
        };

        tracing::info!(
            start_url = %job.start_url,
            domain = %job.domain_scope,
            max_pages = job.max_pages,
            max_depth = job.max_depth,
            "Starting crawl"
        );

        'crawl: loop {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    tracing::info!(pages = records.len(), "Crawl cancelled");
                    break;
                }
            }
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    tracing::info!(pages = records.len(), "Job deadline reached");
                    break;
                }
            }

            // Every entry in a batch shares one depth; deeper discoveries
            // wait until the current level is fully drained
            let batch = frontier.next_batch(self.config.max_concurrent_fetches);
            if batch.is_empty() {
                break;
            }

            tracing::debug!(
                depth = batch[0].depth,
                batch = batch.len(),
                pending = frontier.pending(),
                "Dispatching fetch batch"
            );

            let mut in_flight = JoinSet::new();
            for entry in batch {
                let fetcher = self.fetcher.clone();
                in_flight.spawn(async move {
                    let outcome = fetcher.fetch(&entry.url).await;
                    (entry, outcome)
                });
            }

            // Drain completions as they land, waking periodically so a
            // cancellation or an expired deadline aborts the in-flight
            // fetches instead of waiting out their timeouts
            loop {
                let joined = loop {
                    if let Some(ref flag) = cancel {
                        if flag.load(Ordering::Relaxed) {
                            tracing::info!(
                                pages = records.len(),
                                "Crawl cancelled, aborting in-flight fetches"
                            );
                            in_flight.abort_all();
                            break 'crawl;
                        }
                    }
                    if let Some(deadline) = deadline {
                        if Instant::now() >= deadline {
                            tracing::info!(
                                pages = records.len(),
                                "Job deadline reached, aborting in-flight fetches"
                            );
                            in_flight.abort_all();
                            break 'crawl;
                        }
                    }
                    match tokio::time::timeout(STOP_POLL_INTERVAL, in_flight.join_next()).await {
                        Ok(joined) => break joined,
                        Err(_) => {}
                    }
                };

                let (entry, outcome) = match joined {
                    Some(Ok(result)) => result,
                    Some(Err(err)) => {
                        tracing::error!(error = %err, "Fetch task panicked");
                        continue;
                    }
                    None => break,
                };

                match outcome {
                    FetchOutcome::Success {
                        final_url,
                        status,
                        body,
                        ..
                    } => {
                        // Links resolve against the post-redirect URL; the
                        // record keeps the URL that was actually requested
                        let mut record = extract_page(&body, &final_url);
                        record.url = entry.url.clone();

                        tracing::debug!(
                            url = %entry.url,
                            status,
                            links = record.links.len(),
                            documents = record.document_links.len(),
                            "Extracted page"
                        );

                        for link in &record.links {
                            if in_scope(link, &job.domain_scope) {
                                frontier.enqueue(link.clone(), entry.depth + 1);
                            }
                        }

                        records.push(record);

                        if records.len() % 10 == 0 {
                            let rate = records.len() as f64 / start_time.elapsed().as_secs_f64();
                            tracing::info!(
                                "Progress: {} pages extracted, {} in frontier, {:.2} pages/sec",
                                records.len(),
                                frontier.pending(),
                                rate
                            );
                        }
                    }
                    FetchOutcome::Failure(failure) => {
                        tracing::warn!(url = %entry.url, error = %failure, "Skipping page");
                    }
                }
            }
        }

        tracing::info!(
            start_url = %job.start_url,
            pages = records.len(),
            attempted = frontier.visited_count(),
            "Crawl finished"
        );
        records
    }
}
