//! Statistics about what a scrape run did
//!
//! Counters are collected per page by the paginator, folded per category by
//! the orchestrator and logged as a completion summary.

use std::fmt;
use std::time::Duration;

/// Why a category walk stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminationReason {
    /// The listing page could not be fetched (404, error status, transport)
    ListingUnavailable,

    /// The listing page had no article links
    EmptyListing,

    /// Every link on the listing page had already been seen
    AllSeen,

    /// Every new article on the page was older than the freshness window
    FreshnessWindow,

    /// The configured page cap was reached
    PageLimit,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListingUnavailable => "listing_unavailable",
            Self::EmptyListing => "empty_listing",
            Self::AllSeen => "all_seen",
            Self::FreshnessWindow => "freshness_window",
            Self::PageLimit => "page_limit",
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters for one listing page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageStats {
    /// Links extracted from the listing
    pub listed: usize,

    /// Links dropped because they were already seen
    pub duplicates: usize,

    /// Articles turned into records
    pub scraped: usize,

    /// Articles older than the freshness window
    pub stale: usize,

    /// Articles answering 404
    pub not_found: usize,

    /// Articles with another error status, a transport failure or a task failure
    pub failed: usize,

    /// Articles the adapter could not parse
    pub unparsable: usize,
}

impl PageStats {
    /// Links that were dispatched for fetching
    pub fn dispatched(&self) -> usize {
        self.listed - self.duplicates
    }

    pub fn skipped(&self) -> usize {
        self.stale + self.not_found + self.failed + self.unparsable
    }

    fn add(&mut self, other: &PageStats) {
        self.listed += other.listed;
        self.duplicates += other.duplicates;
        self.scraped += other.scraped;
        self.stale += other.stale;
        self.not_found += other.not_found;
        self.failed += other.failed;
        self.unparsable += other.unparsable;
    }
}

/// Outcome of one category walk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySummary {
    pub category: String,

    /// Listing pages that produced a report
    pub pages: u32,

    /// First and last page walked
    pub first_page: Option<u32>,
    pub last_page: Option<u32>,

    pub totals: PageStats,

    pub termination: Option<TerminationReason>,

    /// Saves that failed during the walk
    pub persistence_failures: u32,
}

impl CategorySummary {
    pub fn new(category: &str) -> Self {
        Self {
            category: category.to_string(),
            ..Self::default()
        }
    }

    /// Folds the counters of a completed page into the summary
    pub fn record_page(&mut self, page: u32, stats: &PageStats) {
        self.pages += 1;
        self.first_page.get_or_insert(page);
        self.last_page = Some(page);
        self.totals.add(stats);
    }

    pub fn new_articles(&self) -> usize {
        self.totals.scraped
    }
}

/// Outcome of one orchestrator run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub categories: Vec<CategorySummary>,
    pub elapsed: Duration,
    /// Records in the snapshot at the end of the run, old and new
    pub total_articles: usize,
}

impl RunSummary {
    pub fn new_articles(&self) -> usize {
        self.categories.iter().map(CategorySummary::new_articles).sum()
    }

    pub fn persistence_failures(&self) -> u32 {
        self.categories.iter().map(|c| c.persistence_failures).sum()
    }

    /// Logs one line per category followed by the run totals
    pub fn log(&self) {
        for category in &self.categories {
            tracing::info!(
                category = %category.category,
                pages = category.pages,
                first_page = ?category.first_page,
                last_page = ?category.last_page,
                new_articles = category.totals.scraped,
                duplicates = category.totals.duplicates,
                stale = category.totals.stale,
                not_found = category.totals.not_found,
                failed = category.totals.failed,
                unparsable = category.totals.unparsable,
                termination = category.termination.map(|t| t.as_str()).unwrap_or("none"),
                "Category finished"
            );
        }

        tracing::info!(
            categories = self.categories.len(),
            new_articles = self.new_articles(),
            total_articles = self.total_articles,
            persistence_failures = self.persistence_failures(),
            elapsed = ?self.elapsed,
            "Scraping run completed"
        );
    }
}
