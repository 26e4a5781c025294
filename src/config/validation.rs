use crate::config::types::{CategoryConfig, Config, CrawlerConfig, OutputConfig, SiteConfig};
use crate::url::parse_http_url;
use crate::ConfigError;
use scraper::Selector;
use std::collections::HashSet;

/// Placeholder substituted with the page number in `subsequent-pages`
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_schedule(config.schedule.interval_secs)?;
    validate_output_config(&config.output)?;
    validate_site_config(&config.site)?;
    validate_categories(&config.categories)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_articles < 1 || config.max_concurrent_articles > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_articles must be between 1 and 100, got {}",
            config.max_concurrent_articles
        )));
    }

    if config.max_attempts < 1 || config.max_attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be between 1 and 10, got {}",
            config.max_attempts
        )));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    for status in &config.retry_statuses {
        if !(100..=599).contains(status) {
            return Err(ConfigError::Validation(format!(
                "retry_statuses contains invalid HTTP status {}",
                status
            )));
        }
        if *status == 200 || *status == 404 {
            return Err(ConfigError::Validation(format!(
                "retry_statuses cannot contain {}",
                status
            )));
        }
    }

    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

fn validate_schedule(interval_secs: u64) -> Result<(), ConfigError> {
    if interval_secs < 60 {
        return Err(ConfigError::Validation(format!(
            "interval_secs must be >= 60, got {}",
            interval_secs
        )));
    }
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.articles_path.is_empty() {
        return Err(ConfigError::Validation(
            "articles_path cannot be empty".to_string(),
        ));
    }

    if config.progress_path.is_empty() {
        return Err(ConfigError::Validation(
            "progress_path cannot be empty".to_string(),
        ));
    }

    if config.articles_path == config.progress_path {
        return Err(ConfigError::Validation(
            "articles_path and progress_path must differ".to_string(),
        ));
    }

    Ok(())
}

/// Validates the site section, including every selector
fn validate_site_config(site: &SiteConfig) -> Result<(), ConfigError> {
    if site.name.trim().is_empty() {
        return Err(ConfigError::Validation("site name cannot be empty".to_string()));
    }

    parse_http_url(&site.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("base_url '{}': {}", site.base_url, e)))?;

    if site.freshness_window_days == Some(0) {
        return Err(ConfigError::Validation(
            "freshness_window_days must be >= 1 when set".to_string(),
        ));
    }

    validate_selector(&site.listing_item_selector)?;
    validate_selector(&site.listing_link_selector)?;
    validate_selector(&site.body_paragraph_selector)?;
    for selector in [
        &site.title_selector,
        &site.author_selector,
        &site.date_selector,
        &site.body_selector,
        &site.links_selector,
    ]
    .into_iter()
    .flatten()
    {
        validate_selector(selector)?;
    }

    Ok(())
}

/// Validates category entries
fn validate_categories(categories: &[CategoryConfig]) -> Result<(), ConfigError> {
    if categories.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[category]] is required".to_string(),
        ));
    }

    let mut names = HashSet::new();
    for category in categories {
        if category.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "category name cannot be empty".to_string(),
            ));
        }

        if !names.insert(category.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate category '{}'",
                category.name
            )));
        }

        if category.first_page.is_empty() {
            return Err(ConfigError::Validation(format!(
                "category '{}' has an empty first_page",
                category.name
            )));
        }

        if !category.subsequent_pages.contains(PAGE_PLACEHOLDER) {
            return Err(ConfigError::Validation(format!(
                "category '{}': subsequent_pages must contain {}",
                category.name, PAGE_PLACEHOLDER
            )));
        }
    }

    Ok(())
}

fn validate_selector(selector: &str) -> Result<(), ConfigError> {
    Selector::parse(selector)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidSelector {
            selector: selector.to_string(),
            message: e.to_string(),
        })
}
