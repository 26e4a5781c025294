use crate::output::traits::{OutputResult, OutputSink};
use crate::output::{CategoryResultSet, Snapshot};
use crate::storage::write_atomically;
use std::path::{Path, PathBuf};

/// Writes the article snapshot as pretty-printed JSON
pub struct JsonOutputSink {
    path: PathBuf,
}

impl JsonOutputSink {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl OutputSink for JsonOutputSink {
    fn load(&self) -> CategoryResultSet {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %self.path.display(), error = %e, "Cannot read snapshot");
                }
                return CategoryResultSet::new();
            }
        };

        match serde_json::from_str::<Snapshot>(&content) {
            Ok(snapshot) => {
                tracing::info!(
                    path = %self.path.display(),
                    articles = snapshot.articles.total(),
                    "Loaded previous snapshot"
                );
                snapshot.articles
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Snapshot is corrupt, starting from an empty result set"
                );
                CategoryResultSet::new()
            }
        }
    }

    fn save(&mut self, snapshot: &Snapshot) -> OutputResult<()> {
        let json = serde_json::to_vec_pretty(snapshot)?;
        write_atomically(&self.path, &json)?;
        tracing::debug!(
            path = %self.path.display(),
            articles = snapshot.articles.total(),
            "Saved snapshot"
        );
        Ok(())
    }
}
