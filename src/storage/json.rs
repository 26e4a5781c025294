//! JSON file progress store
//!
//! All categories share one document:
//!
//! ```json
//! {
//!   "Opinion": { "last_scraped_page": 3, "exhausted": false, "seen_urls": ["https://..."] }
//! }
//! ```

use crate::state::{PaginationCursor, SeenUrlSet};
use crate::storage::traits::{ProgressStore, StorageResult};
use crate::storage::{write_atomically, CategoryProgress};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredCategory {
    #[serde(flatten)]
    cursor: PaginationCursor,

    #[serde(default)]
    seen_urls: Vec<String>,
}

/// Progress store backed by a single JSON file
///
/// The whole document is kept in memory and rewritten atomically on every
/// save, so the file is always a complete, parseable snapshot.
pub struct JsonProgressStore {
    path: PathBuf,
    categories: BTreeMap<String, StoredCategory>,
}

impl JsonProgressStore {
    /// Opens the store at `path`
    ///
    /// A missing file starts empty. A corrupt file is logged and ignored; it is
    /// overwritten by the next successful save.
    pub fn open(path: &Path) -> Self {
        let categories = match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(categories) => categories,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Progress file is corrupt, starting from empty progress"
                    );
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No progress file yet");
                BTreeMap::new()
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Cannot read progress file, starting from empty progress"
                );
                BTreeMap::new()
            }
        };

        Self {
            path: path.to_path_buf(),
            categories,
        }
    }
}

impl ProgressStore for JsonProgressStore {
    fn load(&self, category: &str) -> CategoryProgress {
        self.categories
            .get(category)
            .map(|stored| CategoryProgress {
                seen: SeenUrlSet::from_keys(stored.seen_urls.iter().cloned()),
                cursor: stored.cursor,
            })
            .unwrap_or_default()
    }

    fn save(
        &mut self,
        category: &str,
        seen: &SeenUrlSet,
        cursor: &PaginationCursor,
    ) -> StorageResult<()> {
        let mut categories = self.categories.clone();
        categories.insert(
            category.to_string(),
            StoredCategory {
                cursor: *cursor,
                seen_urls: seen.sorted_keys(),
            },
        );

        let json = serde_json::to_vec_pretty(&categories)?;
        write_atomically(&self.path, &json)?;

        // Only adopt the new state once it is on disk.
        self.categories = categories;
        tracing::debug!(
            category,
            page = cursor.walk_position(),
            seen = seen.len(),
            "Saved progress"
        );
        Ok(())
    }
}
