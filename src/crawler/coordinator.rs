//! Category orchestrator - one scrape run across every category
//!
//! For each configured category, in order, the orchestrator:
//! - Loads the stored progress and merges in URLs already in the snapshot
//! - Walks the listing pages with a [`Paginator`]
//! - Appends each page's records and persists snapshot then progress
//!
//! Persistence failures are logged and counted; they never stop a run.

use crate::adapter::{SelectorAdapter, SiteAdapter};
use crate::config::Config;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::limiter::ConcurrencyLimiter;
use crate::crawler::paginator::Paginator;
use crate::crawler::processor::ArticleProcessor;
use crate::output::{
    CategoryResultSet, CategorySummary, JournalInfo, JsonOutputSink, OutputSink, RunSummary,
    Snapshot, TerminationReason,
};
use crate::state::{PaginationCursor, SeenUrlSet};
use crate::storage::{CategoryProgress, JsonProgressStore, MemoryProgressStore, ProgressStore};
use crate::url::dedup_key;
use crate::KiosqueError;
use chrono::NaiveDateTime;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// Drives scrape runs for one configured site
pub struct Orchestrator {
    config: Arc<Config>,
    adapter: Arc<dyn SiteAdapter>,
    fetcher: Fetcher,
    limiter: ConcurrencyLimiter,
    progress: Box<dyn ProgressStore>,
    output: Box<dyn OutputSink>,
    results: CategoryResultSet,
    journal: JournalInfo,
}

impl Orchestrator {
    /// Creates an orchestrator, preloading the existing snapshot from `output`
    pub fn new(
        config: Config,
        progress: Box<dyn ProgressStore>,
        output: Box<dyn OutputSink>,
        adapter: Arc<dyn SiteAdapter>,
    ) -> Result<Self, KiosqueError> {
        let results = output.load();
        Self::build(config, progress, output, adapter, results)
    }

    /// Creates the orchestrator described by the configuration
    ///
    /// With `fresh`, progress is kept in memory and the previous snapshot is
    /// not loaded, so the run starts from page 1 with an empty result set.
    pub fn from_config(config: Config, fresh: bool) -> Result<Self, KiosqueError> {
        let adapter: Arc<dyn SiteAdapter> = Arc::new(SelectorAdapter::from_config(&config)?);
        let output = Box::new(JsonOutputSink::new(Path::new(&config.output.articles_path)));

        if fresh {
            tracing::info!("Fresh run: ignoring stored progress and previous snapshot");
            Self::build(
                config,
                Box::new(MemoryProgressStore::new()),
                output,
                adapter,
                CategoryResultSet::new(),
            )
        } else {
            let progress = Box::new(JsonProgressStore::open(Path::new(
                &config.output.progress_path,
            )));
            Self::new(config, progress, output, adapter)
        }
    }

    fn build(
        config: Config,
        progress: Box<dyn ProgressStore>,
        output: Box<dyn OutputSink>,
        adapter: Arc<dyn SiteAdapter>,
        results: CategoryResultSet,
    ) -> Result<Self, KiosqueError> {
        let fetcher = Fetcher::from_config(&config)?;
        let limiter = ConcurrencyLimiter::new(config.crawler.max_concurrent_articles as usize);
        let journal = JournalInfo {
            name: config.site.name.clone(),
            url: config.site.base_url.clone(),
        };

        Ok(Self {
            config: Arc::new(config),
            adapter,
            fetcher,
            limiter,
            progress,
            output,
            results,
            journal,
        })
    }

    /// Every record collected so far, including preloaded ones
    pub fn results(&self) -> &CategoryResultSet {
        &self.results
    }

    /// Runs every category once with the current local time
    pub async fn run_once(&mut self) -> RunSummary {
        self.run_once_at(chrono::Local::now().naive_local()).await
    }

    /// Runs every category once, judging freshness against `now`
    pub async fn run_once_at(&mut self, now: NaiveDateTime) -> RunSummary {
        let started = Instant::now();
        tracing::info!(
            site = %self.journal.name,
            categories = self.config.categories.len(),
            "Starting scraping run"
        );

        let processor = ArticleProcessor::new(
            self.fetcher.clone(),
            self.limiter.clone(),
            self.adapter.clone(),
            now,
        );

        let categories: Vec<String> = self
            .config
            .categories
            .iter()
            .map(|c| c.name.clone())
            .collect();

        let mut summary = RunSummary::default();
        for category in &categories {
            let category_summary = self.run_category(category, &processor).await;
            summary.categories.push(category_summary);
        }

        if let Err(e) = self.save_snapshot() {
            tracing::error!(error = %e, "Final snapshot save failed");
        }

        summary.elapsed = started.elapsed();
        summary.total_articles = self.results.total();
        summary.log();
        summary
    }

    async fn run_category(&mut self, category: &str, processor: &ArticleProcessor) -> CategorySummary {
        let mut summary = CategorySummary::new(category);
        let CategoryProgress { mut seen, mut cursor } = self.progress.load(category);

        seen.merge(self.snapshot_keys(category));
        self.results.ensure_category(category);

        let start_page = cursor.resume_page();
        tracing::info!(
            category,
            start_page,
            seen = seen.len(),
            "Starting category"
        );

        let mut paginator = Paginator::new(
            category,
            start_page,
            self.config.crawler.max_pages,
            self.adapter.clone(),
            self.fetcher.clone(),
            processor.clone(),
        );

        while let Some(report) = paginator.next_page(&mut seen).await {
            summary.record_page(report.page, &report.stats);
            self.results.append(category, report.articles);

            // A capped walk is resumed by the next run instead of restarting
            let exhausted = report.is_last && report.termination != Some(TerminationReason::PageLimit);
            cursor.complete(report.page, exhausted);
            summary.persistence_failures += self.persist(category, &seen, &cursor);
        }

        summary.termination = paginator.termination();

        // A walk that moved the cursor and then ran out of pages starts over
        // at page 1 next time; an untouched cursor stays as it was.
        if summary.termination != Some(TerminationReason::PageLimit)
            && !cursor.exhausted
            && cursor.walk_position() > 0
        {
            cursor.mark_exhausted();
            summary.persistence_failures += self.persist(category, &seen, &cursor);
        }

        summary
    }

    /// Dedup keys of the records already in the snapshot for `category`
    fn snapshot_keys(&self, category: &str) -> SeenUrlSet {
        SeenUrlSet::from_keys(
            self.results
                .records(category)
                .iter()
                .filter_map(|record| Url::parse(&record.url).ok())
                .map(|url| dedup_key(&url)),
        )
    }

    /// Saves the snapshot, then the progress; returns the number of failures
    ///
    /// Progress is only written once the records it refers to are on disk.
    fn persist(&mut self, category: &str, seen: &SeenUrlSet, cursor: &PaginationCursor) -> u32 {
        if let Err(e) = self.save_snapshot() {
            tracing::error!(category, error = %e, "Failed to save snapshot");
            return 1;
        }

        match self.progress.save(category, seen, cursor) {
            Ok(()) => 0,
            Err(e) => {
                tracing::error!(category, error = %e, "Failed to save progress");
                1
            }
        }
    }

    fn save_snapshot(&mut self) -> crate::output::OutputResult<()> {
        let snapshot = Snapshot {
            journal_info: self.journal.clone(),
            articles: self.results.clone(),
        };
        self.output.save(&snapshot)
    }
}

/// Runs one scrape of the configured site with the stored progress
///
/// # Example
///
/// ```no_run
/// # use kiosque::config::load_config;
/// # use std::path::Path;
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("businessnews.toml"))?;
/// let summary = kiosque::run_once(config).await?;
/// println!("{} new articles", summary.new_articles());
/// # Ok(())
/// # }
/// ```
pub async fn run_once(config: Config) -> Result<RunSummary, KiosqueError> {
    let mut orchestrator = Orchestrator::from_config(config, false)?;
    Ok(orchestrator.run_once().await)
}
