use std::fmt;

use serde::{Deserialize, Serialize};

/// A candidate post found on a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostReference {
    pub author: String,
    pub url: String,
}

impl PostReference {
    pub fn new(author: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Created,
    Skipped,
    Failed,
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostStatus::Created => write!(f, "created"),
            PostStatus::Skipped => write!(f, "skipped"),
            PostStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Counters reported when a run reaches `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RunSummary {
    pub found: usize,
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn processed(&self) -> usize {
        self.created + self.skipped + self.failed
    }

    pub(crate) fn record(&mut self, status: PostStatus) {
        match status {
            PostStatus::Created => self.created += 1,
            PostStatus::Skipped => self.skipped += 1,
            PostStatus::Failed => self.failed += 1,
        }
    }
}
