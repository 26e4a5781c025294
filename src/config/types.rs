use serde::Deserialize;

/// Browser-like user agent sent when the config does not override it
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Main configuration structure for Kiosque
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    pub output: OutputConfig,
    pub site: SiteConfig,
    #[serde(default, rename = "category")]
    pub categories: Vec<CategoryConfig>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of articles fetched and parsed at the same time
    #[serde(rename = "max-concurrent-articles", default = "default_concurrency")]
    pub max_concurrent_articles: u32,

    /// Number of attempts per request before giving up
    #[serde(rename = "max-attempts", default = "default_attempts")]
    pub max_attempts: u32,

    /// Base delay of the exponential backoff (milliseconds)
    #[serde(rename = "backoff-base-ms", default = "default_backoff_ms")]
    pub backoff_base_ms: u64,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// HTTP statuses retried with backoff like transport failures
    #[serde(rename = "retry-statuses", default)]
    pub retry_statuses: Vec<u16>,

    /// Optional cap on the number of listing pages walked per category and run
    #[serde(rename = "max-pages", default)]
    pub max_pages: Option<u32>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_articles: default_concurrency(),
            max_attempts: default_attempts(),
            backoff_base_ms: default_backoff_ms(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            retry_statuses: Vec::new(),
            max_pages: None,
        }
    }
}

/// Outgoing request configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
        }
    }
}

/// Interval between scheduled runs
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    #[serde(rename = "interval-secs", default = "default_interval")]
    pub interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the JSON article snapshot
    #[serde(rename = "articles-path")]
    pub articles_path: String,

    /// Path to the JSON progress file
    #[serde(rename = "progress-path")]
    pub progress_path: String,
}

/// The scraped site and the selectors used to extract its articles
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Journal name written to the snapshot
    pub name: String,

    /// Base URL every relative link is resolved against
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Articles older than this many days are dropped and stop the walk
    #[serde(rename = "freshness-window-days", default)]
    pub freshness_window_days: Option<u32>,

    /// One element per article on a listing page
    #[serde(rename = "listing-item-selector")]
    pub listing_item_selector: String,

    /// Link inside a listing item
    #[serde(rename = "listing-link-selector", default = "default_link_selector")]
    pub listing_link_selector: String,

    #[serde(rename = "title-selector", default)]
    pub title_selector: Option<String>,

    #[serde(rename = "author-selector", default)]
    pub author_selector: Option<String>,

    /// Leading word removed from the author text (e.g. "Par")
    #[serde(rename = "author-prefix", default)]
    pub author_prefix: Option<String>,

    /// Remove the byline text when the body repeats it
    #[serde(rename = "strip-author-from-body", default)]
    pub strip_author_from_body: bool,

    #[serde(rename = "date-selector", default)]
    pub date_selector: Option<String>,

    /// Attribute holding the date; the element text is used when unset
    #[serde(rename = "date-attribute", default)]
    pub date_attribute: Option<String>,

    /// chrono format strings tried in order
    #[serde(rename = "date-formats", default)]
    pub date_formats: Vec<String>,

    #[serde(rename = "body-selector", default)]
    pub body_selector: Option<String>,

    /// Blocks inside the body joined into the article text
    #[serde(rename = "body-paragraph-selector", default = "default_paragraph_selector")]
    pub body_paragraph_selector: String,

    #[serde(rename = "links-selector", default)]
    pub links_selector: Option<String>,

    /// Derive the title from the URL slug when no title is found
    #[serde(rename = "title-from-url", default = "default_true")]
    pub title_from_url: bool,
}

/// A category listing paginated independently
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryConfig {
    pub name: String,

    /// Path or URL of the first listing page
    #[serde(rename = "first-page")]
    pub first_page: String,

    /// Template for later pages; `{page}` is replaced by the page number
    #[serde(rename = "subsequent-pages")]
    pub subsequent_pages: String,
}

fn default_concurrency() -> u32 {
    5
}

fn default_attempts() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    1000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_interval() -> u64 {
    3600
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_link_selector() -> String {
    "a[href]".to_string()
}

fn default_paragraph_selector() -> String {
    "p".to_string()
}

fn default_true() -> bool {
    true
}
