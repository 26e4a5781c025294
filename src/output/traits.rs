//! Output sink trait and error types

use crate::output::{CategoryResultSet, Snapshot};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize snapshot: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Failed to write snapshot: {0}")]
    Write(#[from] crate::storage::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination of the full article snapshot
///
/// Every save replaces the whole document; there is no append mode.
pub trait OutputSink: Send {
    /// Loads the previously written results, or an empty set
    fn load(&self) -> CategoryResultSet;

    /// Replaces the stored snapshot
    fn save(&mut self, snapshot: &Snapshot) -> OutputResult<()>;
}
