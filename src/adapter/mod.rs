//! Site adapters: the only code that knows about a site's markup
//!
//! The crawler core talks to a site exclusively through [`SiteAdapter`]:
//!
//! | Operation | Purpose |
//! |-----------|---------|
//! | `listing_url` | URL of page N of a category listing |
//! | `extract_listing_links` | Article links (and title hints) on a listing page |
//! | `extract_article_fields` | Title, author, date, body and links of an article |
//! | `freshness_window_days` | Age limit for articles, if the site is time-boxed |
//!
//! [`SelectorAdapter`] implements the trait from CSS selectors and URL
//! templates in the configuration, which covers every site scraped so far.

mod dates;
mod selector;

pub use dates::parse_date;
pub use selector::SelectorAdapter;

use chrono::NaiveDateTime;
use thiserror::Error;
use url::Url;

/// Errors raised by an adapter
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Unknown category: {0}")]
    MissingCategory(String),

    #[error("Cannot build URL from '{template}': {message}")]
    Template { template: String, message: String },

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Extraction failed for {url}: {message}")]
    Extraction { url: String, message: String },
}

/// An article link found on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingLink {
    /// Absolute article URL
    pub url: Url,

    /// Link text or title attribute, used when the article has no title
    pub title_hint: Option<String>,
}

/// Candidate field values extracted from an article page
///
/// Every field is optional; the processor substitutes placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleFields {
    pub title: Option<String>,
    pub author: Option<String>,

    /// Date text as found on the page
    pub date_raw: Option<String>,

    /// `date_raw` parsed, when it matched a known format
    pub published_at: Option<NaiveDateTime>,

    pub body: Option<String>,

    /// Absolute outbound links in document order
    pub links: Vec<String>,
}

/// Site-specific extraction logic
///
/// Implementations must be pure with respect to their inputs: the same HTML
/// always produces the same fields. They are shared between article tasks,
/// hence `Send + Sync`.
pub trait SiteAdapter: Send + Sync {
    /// URL of listing page `page` (1-based) of `category`
    fn listing_url(&self, category: &str, page: u32) -> Result<Url, AdapterError>;

    /// Article links of a listing page, in listing order
    fn extract_listing_links(&self, html: &str) -> Vec<ListingLink>;

    /// Field values of an article page
    fn extract_article_fields(&self, html: &str, url: &Url) -> Result<ArticleFields, AdapterError>;

    /// Age limit in days, or None when the site keeps every article
    fn freshness_window_days(&self) -> Option<u32>;

    /// Whether a title may be derived from the URL slug
    fn title_from_url(&self) -> bool {
        true
    }
}
