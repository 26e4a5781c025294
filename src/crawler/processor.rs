//! Turns one article link into a record or a skip

use crate::adapter::{ListingLink, SiteAdapter};
use crate::crawler::fetcher::{FetchOutcome, Fetcher};
use crate::crawler::limiter::ConcurrencyLimiter;
use crate::output::{ArticleRecord, AUTHOR_PLACEHOLDER, BODY_PLACEHOLDER, TITLE_PLACEHOLDER};
use crate::url::title_from_slug;
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;

/// Why an article produced no record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotFound,
    Failed { status: u16 },
    Transport(String),
    /// Published before the freshness cutoff
    Stale { published: NaiveDateTime },
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    Article(ArticleRecord),
    Skip(SkipReason),
}

/// Fetches and parses articles for one run
///
/// `now` is fixed when the processor is built, so every freshness decision
/// of a run uses the same cutoff.
#[derive(Clone)]
pub struct ArticleProcessor {
    fetcher: Fetcher,
    limiter: ConcurrencyLimiter,
    adapter: Arc<dyn SiteAdapter>,
    now: NaiveDateTime,
}

impl ArticleProcessor {
    pub fn new(
        fetcher: Fetcher,
        limiter: ConcurrencyLimiter,
        adapter: Arc<dyn SiteAdapter>,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            fetcher,
            limiter,
            adapter,
            now,
        }
    }

    /// Oldest publication day still accepted, if the site has a window
    ///
    /// Sites mostly publish dates without a time of day, so the window is
    /// counted in calendar days: with a 10-day window on the 20th, anything
    /// dated the 10th or later is kept.
    pub fn cutoff(&self) -> Option<NaiveDate> {
        self.adapter
            .freshness_window_days()
            .map(|days| (self.now - chrono::Duration::days(i64::from(days))).date())
    }

    /// Builds the record for an already fetched article page
    pub fn process(&self, html: &str, link: &ListingLink) -> ProcessOutcome {
        let fields = match self.adapter.extract_article_fields(html, &link.url) {
            Ok(fields) => fields,
            Err(e) => {
                tracing::warn!(url = %link.url, error = %e, "Cannot parse article");
                return ProcessOutcome::Skip(SkipReason::Parse(e.to_string()));
            }
        };

        if let (Some(cutoff), Some(published)) = (self.cutoff(), fields.published_at) {
            if published.date() < cutoff {
                tracing::debug!(url = %link.url, %published, "Article older than freshness window");
                return ProcessOutcome::Skip(SkipReason::Stale { published });
            }
        }

        let title = fields
            .title
            .or_else(|| link.title_hint.clone())
            .or_else(|| {
                if self.adapter.title_from_url() {
                    title_from_slug(&link.url)
                } else {
                    None
                }
            })
            .unwrap_or_else(|| TITLE_PLACEHOLDER.to_string());

        ProcessOutcome::Article(ArticleRecord {
            url: link.url.to_string(),
            title,
            author: fields
                .author
                .unwrap_or_else(|| AUTHOR_PLACEHOLDER.to_string()),
            published_at: fields.published_at,
            date_of_publication: fields.date_raw,
            body: fields.body.unwrap_or_else(|| BODY_PLACEHOLDER.to_string()),
            outbound_links: fields.links,
        })
    }

    /// Fetches and processes one article inside a limiter slot
    pub async fn fetch_and_process(&self, link: ListingLink) -> ProcessOutcome {
        self.limiter
            .run(async {
                match self.fetcher.fetch(&link.url).await {
                    Ok(FetchOutcome::Page(html)) => self.process(&html, &link),
                    Ok(FetchOutcome::NotFound) => {
                        tracing::info!(url = %link.url, "Article not found");
                        ProcessOutcome::Skip(SkipReason::NotFound)
                    }
                    Ok(FetchOutcome::Failed { status }) => {
                        tracing::warn!(url = %link.url, status, "Article unavailable");
                        ProcessOutcome::Skip(SkipReason::Failed { status })
                    }
                    Err(e) => {
                        tracing::warn!(url = %link.url, error = %e, "Article fetch failed");
                        ProcessOutcome::Skip(SkipReason::Transport(e.to_string()))
                    }
                }
            })
            .await
    }
}
