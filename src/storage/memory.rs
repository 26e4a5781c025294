use crate::state::{PaginationCursor, SeenUrlSet};
use crate::storage::traits::{ProgressStore, StorageResult};
use crate::storage::CategoryProgress;
use std::collections::HashMap;

/// Progress store that lives only for the current process
///
/// Used by `--fresh` runs, which must not read or clobber the progress file.
#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    categories: HashMap<String, CategoryProgress>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryProgressStore {
    fn load(&self, category: &str) -> CategoryProgress {
        self.categories.get(category).cloned().unwrap_or_default()
    }

    fn save(
        &mut self,
        category: &str,
        seen: &SeenUrlSet,
        cursor: &PaginationCursor,
    ) -> StorageResult<()> {
        self.categories.insert(
            category.to_string(),
            CategoryProgress {
                seen: seen.clone(),
                cursor: *cursor,
            },
        );
        Ok(())
    }
}
