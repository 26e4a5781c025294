use serde::{Deserialize, Serialize};

/// Per-category pagination progress
///
/// `last_completed_page` is the deepest page ever persisted for the category
/// and never decreases. `walk_page` is the last page persisted by the current
/// walk, which restarts at page 1 after every finished walk. `exhausted`
/// records that the previous walk ended on a termination trigger rather than
/// being interrupted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationCursor {
    #[serde(rename = "last_scraped_page", default)]
    pub last_completed_page: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub walk_page: Option<u32>,

    #[serde(default)]
    pub exhausted: bool,
}

impl PaginationCursor {
    /// Cursor of a walk interrupted after `page`
    pub fn interrupted_at(page: u32) -> Self {
        Self {
            last_completed_page: page,
            walk_page: Some(page),
            exhausted: false,
        }
    }

    /// Last page persisted by the current walk
    ///
    /// Progress files without a walk position fall back to the high-water
    /// mark.
    pub fn walk_position(&self) -> u32 {
        self.walk_page.unwrap_or(self.last_completed_page)
    }

    /// Page the next walk should start from
    ///
    /// A finished or never-started walk begins again at page 1, where new
    /// articles appear; an interrupted one picks up after the last page that
    /// was persisted.
    pub fn resume_page(&self) -> u32 {
        let position = self.walk_position();
        if self.exhausted || position == 0 {
            1
        } else {
            position + 1
        }
    }

    /// Records that `page` was fully fetched and persisted
    pub fn complete(&mut self, page: u32, is_last: bool) {
        self.last_completed_page = self.last_completed_page.max(page);
        self.walk_page = Some(page);
        self.exhausted = is_last;
    }

    /// Marks the walk as finished without completing another page
    pub fn mark_exhausted(&mut self) {
        self.exhausted = true;
    }
}
