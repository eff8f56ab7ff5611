//! Crawl job state: frontier queue and visited set
//!
//! The [`Frontier`] owns all per-job traversal state. It is a plain value
//! mutated only by the coordinating task; concurrency lives in the fetch
//! leaves, so no locking happens here.
//!
//! URL identity is the normalized form from [`crate::url::normalize_url`],
//! which makes `https://acme.com/about/` and `https://www.acme.com/about`
//! the same frontier entry.

use crate::config::CrawlerConfig;
use crate::url::{normalize_url, registrable_domain};
use crate::{DossierError, Result};
use std::collections::{HashSet, VecDeque};
use url::Url;

/// Immutable description of one site crawl
#[derive(Debug, Clone)]
pub struct CrawlJob {
    /// Seed URL the traversal starts from
    pub start_url: Url,
    /// Maximum number of fetch attempts
    pub max_pages: usize,
    /// Maximum link depth relative to the seed (0 = seed only)
    pub max_depth: u32,
    /// Registrable domain the traversal is confined to
    pub domain_scope: String,
}

impl CrawlJob {
    /// Builds a job for one seed URL, deriving the domain scope
    ///
    /// Fails with [`DossierError::SeedWithoutHost`] when the URL has no
    /// host to scope the crawl to.
    pub fn new(start_url: Url, config: &CrawlerConfig) -> Result<Self> {
        let domain_scope = registrable_domain(&start_url)
            .ok_or_else(|| DossierError::SeedWithoutHost(start_url.to_string()))?;

        Ok(CrawlJob {
            start_url,
            max_pages: config.max_pages,
            max_depth: config.max_depth,
            domain_scope,
        })
    }
}

/// One queued URL awaiting fetch
#[derive(Debug, Clone)]
pub struct FrontierEntry {
    pub url: Url,
    pub depth: u32,
}

/// BFS queue plus visited set for a single [`CrawlJob`]
///
/// Entries are admitted once: `enqueue` drops anything beyond `max_depth`,
/// already visited, or already queued. `next_batch` marks entries visited
/// at dispatch time, so failed fetches still count against `max_pages` and
/// are never retried.
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    queued: HashSet<String>,
    visited: HashSet<String>,
    max_pages: usize,
    max_depth: u32,
}

impl Frontier {
    /// Creates a frontier seeded with the job's start URL at depth 0
    pub fn new(job: &CrawlJob) -> Self {
        let mut frontier = Frontier {
            queue: VecDeque::new(),
            queued: HashSet::new(),
            visited: HashSet::new(),
            max_pages: job.max_pages,
            max_depth: job.max_depth,
        };
        frontier.enqueue(job.start_url.clone(), 0);
        frontier
    }

    /// Adds a URL at the given depth; returns whether it was admitted
    pub fn enqueue(&mut self, url: Url, depth: u32) -> bool {
        if depth > self.max_depth {
            return false;
        }

        let key = identity_key(&url);
        if self.visited.contains(&key) || self.queued.contains(&key) {
            return false;
        }

        self.queued.insert(key);
        self.queue.push_back(FrontierEntry { url, depth });
        true
    }

    /// Pops up to `limit` entries for dispatch, marking each visited
    ///
    /// A batch never spans BFS levels: only entries sharing the front
    /// entry's depth are taken, so the current level fully drains before
    /// deeper entries dispatch. Returns an empty batch once the queue is
    /// empty or `max_pages` attempts have been handed out.
    pub fn next_batch(&mut self, limit: usize) -> Vec<FrontierEntry> {
        let mut batch = Vec::new();

        let level = match self.queue.front() {
            Some(entry) => entry.depth,
            None => return batch,
        };

        while batch.len() < limit && self.visited.len() < self.max_pages {
            let at_level = self
                .queue
                .front()
                .map(|entry| entry.depth == level)
                .unwrap_or(false);
            if !at_level {
                break;
            }
            if let Some(entry) = self.queue.pop_front() {
                let key = identity_key(&entry.url);
                self.queued.remove(&key);
                self.visited.insert(key);
                batch.push(entry);
            }
        }

        batch
    }

    /// Number of fetch attempts handed out so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Number of entries still waiting for dispatch
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

/// Normalized string identity used for visited/queued membership
fn identity_key(url: &Url) -> String {
    match normalize_url(url.as_str()) {
        Ok(normalized) => normalized.to_string(),
        Err(_) => url.to_string(),
    }
}
