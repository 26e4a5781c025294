//! Storage traits and error types
//!
//! This module defines the trait interface for progress stores and
//! associated error types.

use crate::state::{PaginationCursor, SeenUrlSet};
use crate::storage::CategoryProgress;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to replace {path}: {message}")]
    Persist { path: String, message: String },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable record of what has been scraped per category
///
/// Implementations must make `save` atomic from a reader's point of view:
/// after a crash the store holds either the previous or the new state.
pub trait ProgressStore: Send {
    /// Loads the progress of a category
    ///
    /// A missing or unreadable store yields the empty state (cursor at page 0,
    /// no seen URLs) instead of an error, so a damaged file never blocks a run.
    fn load(&self, category: &str) -> CategoryProgress;

    /// Persists the seen set and cursor of a category
    fn save(
        &mut self,
        category: &str,
        seen: &SeenUrlSet,
        cursor: &PaginationCursor,
    ) -> StorageResult<()>;
}
