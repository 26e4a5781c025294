//! Storage module for persisting scrape progress
//!
//! This module handles the durable state that makes runs resumable:
//! - The set of article URLs already processed per category
//! - The last listing page completed per category
//! - Atomic full-file rewrites shared with the output snapshot

mod json;
mod memory;
mod traits;

pub use json::JsonProgressStore;
pub use memory::MemoryProgressStore;
pub use traits::{ProgressStore, StorageError, StorageResult};

use crate::state::{PaginationCursor, SeenUrlSet};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Progress of one category as loaded from a store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryProgress {
    pub seen: SeenUrlSet,
    pub cursor: PaginationCursor,
}

/// Replaces `path` with `contents` through a temporary file and a rename
///
/// The temporary file lives in the destination directory so the final
/// rename never crosses filesystems. Readers observe either the old or the
/// new file, never a partial write.
pub fn write_atomically(path: &Path, contents: &[u8]) -> StorageResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StorageError::Persist {
        path: path.display().to_string(),
        message: e.error.to_string(),
    })?;

    Ok(())
}
