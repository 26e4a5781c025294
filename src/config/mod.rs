//! Configuration module for Kiosque
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use kiosque::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("businessnews.toml")).unwrap();
//! println!("Scraping {} categories", config.categories.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CategoryConfig, Config, CrawlerConfig, HttpConfig, OutputConfig, ScheduleConfig, SiteConfig,
    DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
