//! Crawler module for site traversal and research orchestration
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with bounded concurrency and failure classification
//! - The breadth-first frontier with depth and page budgets
//! - Per-site crawl coordination
//! - Research orchestration across seed URLs

mod coordinator;
mod fetcher;
mod frontier;
mod orchestrator;

pub use coordinator::Crawler;
pub use fetcher::{build_http_client, FetchFailure, FetchOutcome, Fetcher};
pub use frontier::{CrawlJob, Frontier, FrontierEntry};
pub use orchestrator::{research, Orchestrator, SiteResult};
