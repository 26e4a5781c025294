//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the scraper, including:
//! - Building the HTTP client with the configured user agent and timeouts
//! - Bounded retries with exponential backoff
//! - Classifying responses into pages, missing pages and failures

use crate::config::{Config, CrawlerConfig};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Result of a fetch that reached the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Successful response with its body
    Page(String),

    /// HTTP 404
    NotFound,

    /// Any other status, after retries if the status is retryable
    Failed { status: u16 },
}

/// Errors that abort a fetch
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed after {attempts} attempt(s): {source}")]
    Transport {
        url: String,
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },
}

/// When to retry and how long to wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_base: Duration,

    /// HTTP statuses retried like transport failures
    pub retry_statuses: Vec<u16>,
}

impl RetryPolicy {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff_base: Duration::from_millis(config.backoff_base_ms),
            retry_statuses: config.retry_statuses.clone(),
        }
    }

    /// Delay after the failed attempt `attempt` (counted from 0)
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_base.saturating_mul(1u32 << attempt.min(16))
    }

    fn is_retryable(&self, status: StatusCode) -> bool {
        self.retry_statuses.contains(&status.as_u16())
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&CrawlerConfig::default())
    }
}

/// Builds the HTTP client shared by every request of a run
///
/// # Example
///
/// ```no_run
/// use kiosque::config::load_config;
/// use kiosque::crawler::build_http_client;
/// use std::path::Path;
///
/// let config = load_config(Path::new("leaders.toml")).unwrap();
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.http.user_agent.as_str())
        .timeout(Duration::from_secs(config.crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.crawler.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

enum Attempt {
    Done(FetchOutcome),
    RetryStatus(StatusCode),
    RetryTransport(reqwest::Error),
}

/// HTTP client plus retry policy
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            build_http_client(config)?,
            RetryPolicy::from_config(&config.crawler),
        ))
    }

    /// Fetches a URL with bounded retries
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | 2xx | `Page` with the body text |
    /// | 404 | `NotFound`, never retried |
    /// | status in `retry_statuses` | backoff and retry, then `Failed` |
    /// | other status | `Failed`, never retried |
    /// | connect/timeout/body error | backoff and retry, then `FetchError::Transport` |
    pub async fn fetch(&self, url: &Url) -> Result<FetchOutcome, FetchError> {
        let mut attempt = 0;

        loop {
            let retry = match self.attempt(url, attempt).await {
                Attempt::Done(outcome) => return Ok(outcome),
                retry => retry,
            };

            attempt += 1;
            if attempt >= self.policy.max_attempts {
                return match retry {
                    Attempt::RetryStatus(status) => Ok(FetchOutcome::Failed {
                        status: status.as_u16(),
                    }),
                    Attempt::RetryTransport(source) => Err(FetchError::Transport {
                        url: url.to_string(),
                        attempts: attempt,
                        source,
                    }),
                    Attempt::Done(outcome) => Ok(outcome),
                };
            }

            let delay = self.policy.backoff(attempt - 1);
            tracing::debug!(url = %url, delay = ?delay, "Backing off before retry");
            tokio::time::sleep(delay).await;
        }
    }

    async fn attempt(&self, url: &Url, attempt: u32) -> Attempt {
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(url = %url, attempt, error = %e, "Request failed");
                return Attempt::RetryTransport(e);
            }
        };

        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            tracing::debug!(url = %url, attempt, status = status.as_u16(), "Page not found");
            return Attempt::Done(FetchOutcome::NotFound);
        }

        if status.is_success() {
            return match response.text().await {
                Ok(body) => {
                    tracing::debug!(
                        url = %url,
                        attempt,
                        status = status.as_u16(),
                        bytes = body.len(),
                        "Fetched page"
                    );
                    Attempt::Done(FetchOutcome::Page(body))
                }
                Err(e) => {
                    tracing::warn!(url = %url, attempt, error = %e, "Failed to read body");
                    Attempt::RetryTransport(e)
                }
            };
        }

        tracing::warn!(url = %url, attempt, status = status.as_u16(), "Unexpected status");
        if self.policy.is_retryable(status) {
            Attempt::RetryStatus(status)
        } else {
            Attempt::Done(FetchOutcome::Failed {
                status: status.as_u16(),
            })
        }
    }
}
