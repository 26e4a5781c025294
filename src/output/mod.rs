//! Output module for the article snapshot and run statistics
//!
//! This module handles:
//! - The article record and the per-category result collection
//! - Writing and reloading the JSON snapshot
//! - Summarizing what a run did

mod json;
pub mod stats;
mod traits;

pub use json::JsonOutputSink;
pub use stats::{CategorySummary, PageStats, RunSummary, TerminationReason};
pub use traits::{OutputError, OutputResult, OutputSink};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Title used when neither the page nor the URL yield one
pub const TITLE_PLACEHOLDER: &str = "Titre non disponible";

/// Author used when the page names none
pub const AUTHOR_PLACEHOLDER: &str = "Auteur non disponible";

/// Body used when the article text cannot be extracted
pub const BODY_PLACEHOLDER: &str = "Contenu non disponible";

/// One scraped article
///
/// Built once by the article processor and never modified afterwards; the
/// result set only appends records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// Absolute article URL
    pub url: String,

    pub title: String,

    pub author: String,

    /// Parsed publication time, null when absent or unparsable
    pub published_at: Option<NaiveDateTime>,

    /// Publication date as written on the page
    #[serde(default)]
    pub date_of_publication: Option<String>,

    #[serde(rename = "content")]
    pub body: String,

    #[serde(default)]
    pub outbound_links: Vec<String>,
}

/// Journal identification written at the top of the snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalInfo {
    pub name: String,
    pub url: String,
}

/// Ordered article records per category
///
/// Categories are kept sorted by name so successive snapshots diff cleanly;
/// records within a category keep the order they were appended in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryResultSet {
    categories: BTreeMap<String, Vec<ArticleRecord>>,
}

impl CategoryResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends records to a category, creating it if needed
    pub fn append(&mut self, category: &str, records: Vec<ArticleRecord>) {
        self.categories
            .entry(category.to_string())
            .or_default()
            .extend(records);
    }

    /// Ensures a category is present even if it has no records yet
    pub fn ensure_category(&mut self, category: &str) {
        self.categories.entry(category.to_string()).or_default();
    }

    pub fn records(&self, category: &str) -> &[ArticleRecord] {
        self.categories
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Total number of records across categories
    pub fn total(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }
}

/// The document written to the articles file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub journal_info: JournalInfo,
    pub articles: CategoryResultSet,
}
