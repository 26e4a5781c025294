//! Walks the listing pages of one category
//!
//! Each call to [`Paginator::next_page`] fetches one listing page, filters the
//! links through the seen set and fans the new ones out to the article
//! processor. The walk ends on the first of:
//!
//! | Trigger | Result |
//! |---------|--------|
//! | listing cannot be fetched | `None` |
//! | listing has no article links | `None` |
//! | every link already seen | `None` |
//! | freshness window and no record on the page | report with `is_last` |
//! | `max-pages` reached | report with `is_last` |

use crate::adapter::SiteAdapter;
use crate::crawler::fetcher::{FetchOutcome, Fetcher};
use crate::crawler::processor::{ArticleProcessor, ProcessOutcome, SkipReason};
use crate::output::{ArticleRecord, PageStats, TerminationReason};
use crate::state::SeenUrlSet;
use std::sync::Arc;
use tokio::task::JoinSet;

/// What one listing page produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReport {
    pub page: u32,

    /// New records in listing order
    pub articles: Vec<ArticleRecord>,

    /// No further page will be yielded
    pub is_last: bool,

    /// Set together with `is_last`
    pub termination: Option<TerminationReason>,

    pub stats: PageStats,
}

/// Lazy sequence of page reports for one category
pub struct Paginator {
    category: String,
    adapter: Arc<dyn SiteAdapter>,
    fetcher: Fetcher,
    processor: ArticleProcessor,
    next_page: u32,
    pages_walked: u32,
    max_pages: Option<u32>,
    termination: Option<TerminationReason>,
}

impl Paginator {
    pub fn new(
        category: &str,
        start_page: u32,
        max_pages: Option<u32>,
        adapter: Arc<dyn SiteAdapter>,
        fetcher: Fetcher,
        processor: ArticleProcessor,
    ) -> Self {
        Self {
            category: category.to_string(),
            adapter,
            fetcher,
            processor,
            next_page: start_page.max(1),
            pages_walked: 0,
            max_pages,
            termination: None,
        }
    }

    /// Why the walk ended, once it has
    pub fn termination(&self) -> Option<TerminationReason> {
        self.termination
    }

    fn finish(&mut self, reason: TerminationReason) -> Option<PageReport> {
        tracing::info!(
            category = %self.category,
            page = self.next_page,
            reason = %reason,
            "Category walk finished"
        );
        self.termination = Some(reason);
        None
    }

    /// Scrapes the next listing page
    ///
    /// New links are inserted into `seen` before their tasks are spawned, so
    /// a link listed twice is fetched once.
    pub async fn next_page(&mut self, seen: &mut SeenUrlSet) -> Option<PageReport> {
        if self.termination.is_some() {
            return None;
        }

        let page = self.next_page;
        let listing_url = match self.adapter.listing_url(&self.category, page) {
            Ok(url) => url,
            Err(e) => {
                tracing::error!(category = %self.category, page, error = %e, "Cannot build listing URL");
                return self.finish(TerminationReason::ListingUnavailable);
            }
        };

        tracing::info!(category = %self.category, page, url = %listing_url, "Fetching listing page");

        let html = match self.fetcher.fetch(&listing_url).await {
            Ok(FetchOutcome::Page(html)) => html,
            Ok(FetchOutcome::NotFound) => {
                tracing::info!(category = %self.category, page, "Listing page not found");
                return self.finish(TerminationReason::ListingUnavailable);
            }
            Ok(FetchOutcome::Failed { status }) => {
                tracing::warn!(category = %self.category, page, status, "Listing page unavailable");
                return self.finish(TerminationReason::ListingUnavailable);
            }
            Err(e) => {
                tracing::warn!(category = %self.category, page, error = %e, "Listing fetch failed");
                return self.finish(TerminationReason::ListingUnavailable);
            }
        };

        let links = self.adapter.extract_listing_links(&html);
        if links.is_empty() {
            return self.finish(TerminationReason::EmptyListing);
        }

        let mut stats = PageStats {
            listed: links.len(),
            ..PageStats::default()
        };

        let fresh: Vec<_> = links
            .into_iter()
            .filter(|link| seen.insert_if_absent(&link.url))
            .collect();
        stats.duplicates = stats.listed - fresh.len();

        if fresh.is_empty() {
            return self.finish(TerminationReason::AllSeen);
        }

        tracing::debug!(
            category = %self.category,
            page,
            listed = stats.listed,
            new = fresh.len(),
            "Dispatching articles"
        );

        let mut tasks = JoinSet::new();
        let mut slots: Vec<Option<ProcessOutcome>> = (0..fresh.len()).map(|_| None).collect();

        for (index, link) in fresh.into_iter().enumerate() {
            let processor = self.processor.clone();
            tasks.spawn(async move { (index, processor.fetch_and_process(link).await) });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(e) => {
                    tracing::error!(category = %self.category, page, error = %e, "Article task failed")
                }
            }
        }

        let mut articles = Vec::new();
        for slot in slots {
            match slot {
                Some(ProcessOutcome::Article(record)) => articles.push(record),
                Some(ProcessOutcome::Skip(SkipReason::Stale { .. })) => stats.stale += 1,
                Some(ProcessOutcome::Skip(SkipReason::NotFound)) => stats.not_found += 1,
                Some(ProcessOutcome::Skip(SkipReason::Parse(_))) => stats.unparsable += 1,
                Some(ProcessOutcome::Skip(_)) | None => stats.failed += 1,
            }
        }
        stats.scraped = articles.len();

        self.pages_walked += 1;
        self.next_page = page + 1;

        let termination = if articles.is_empty() && self.adapter.freshness_window_days().is_some() {
            Some(TerminationReason::FreshnessWindow)
        } else if self.max_pages.is_some_and(|max| self.pages_walked >= max) {
            Some(TerminationReason::PageLimit)
        } else {
            None
        };

        tracing::info!(
            category = %self.category,
            page,
            scraped = stats.scraped,
            skipped = stats.skipped(),
            duplicates = stats.duplicates,
            "Listing page done"
        );

        if let Some(reason) = termination {
            tracing::info!(category = %self.category, page, reason = %reason, "Category walk finished");
            self.termination = Some(reason);
        }

        Some(PageReport {
            page,
            articles,
            is_last: termination.is_some(),
            termination,
            stats,
        })
    }
}
