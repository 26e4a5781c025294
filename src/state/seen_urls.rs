use crate::url::dedup_key;
use std::collections::HashSet;
use url::Url;

/// Article URLs already processed for one category
///
/// Membership is tracked by [`dedup_key`], so cosmetic differences (tracking
/// parameters, fragments, `www.`) never cause a second fetch. The set only
/// grows; the check and the insert happen in one `&mut self` call, which the
/// paginator makes on the main control path before dispatching any task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenUrlSet {
    keys: HashSet<String>,
}

impl SeenUrlSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a set from stored dedup keys
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Inserts the URL and returns true when it was not seen before
    pub fn insert_if_absent(&mut self, url: &Url) -> bool {
        self.keys.insert(dedup_key(url))
    }

    /// Returns true if the URL has been seen
    pub fn contains(&self, url: &Url) -> bool {
        self.keys.contains(&dedup_key(url))
    }

    /// Adds every key of `other` to this set
    pub fn merge(&mut self, other: SeenUrlSet) {
        self.keys.extend(other.keys);
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns the stored keys in sorted order
    ///
    /// Sorting keeps the progress file stable between saves.
    pub fn sorted_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.keys.iter().cloned().collect();
        keys.sort();
        keys
    }
}
