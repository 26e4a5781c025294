//! URL handling module for Kiosque
//!
//! Link resolution against the site's base URL and dedup-key normalization.

mod normalize;
mod resolve;

pub use normalize::dedup_key;
pub use resolve::{resolve_link, title_from_slug};

use crate::UrlError;
use url::Url;

/// Parses an absolute http(s) URL
///
/// # Examples
///
/// ```
/// use kiosque::url::parse_http_url;
///
/// assert!(parse_http_url("https://www.leaders.com.tn/").is_ok());
/// assert!(parse_http_url("ftp://example.com/").is_err());
/// ```
pub fn parse_http_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}
