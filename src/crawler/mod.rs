//! Crawler module for listing pagination and article scraping
//!
//! This module contains the core scraping logic, including:
//! - HTTP fetching with retry logic
//! - Bounded concurrency for article jobs
//! - Turning article pages into records
//! - Walking category listings page by page
//! - Per-run orchestration and persistence

mod coordinator;
mod fetcher;
mod limiter;
mod paginator;
mod processor;

pub use coordinator::{run_once, Orchestrator};
pub use fetcher::{build_http_client, FetchError, FetchOutcome, Fetcher, RetryPolicy};
pub use limiter::ConcurrencyLimiter;
pub use paginator::{PageReport, Paginator};
pub use processor::{ArticleProcessor, ProcessOutcome, SkipReason};
