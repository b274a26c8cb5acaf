//! Memory record schema.
//!
//! One record per qualifying session. Records are immutable once queued;
//! an external archival process drains the queue later.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::dedup::content_hash;

/// A queued memory record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Human-readable session summary
    pub content: String,

    /// Descriptive metadata (not part of the dedup identity)
    pub metadata: RecordMetadata,

    /// ISO-8601 creation time
    pub timestamp: String,
}

/// Metadata attached to a memory record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    #[serde(default)]
    pub tags: BTreeSet<String>,

    #[serde(default)]
    pub project: String,

    #[serde(default)]
    pub git_branch: Option<String>,

    #[serde(default)]
    pub significance_score: f64,
}

impl MemoryRecord {
    /// Create a record stamped with the current time.
    pub fn new(content: impl Into<String>, metadata: RecordMetadata) -> Self {
        Self {
            content: content.into(),
            metadata,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Dedup identity of this record.
    pub fn content_hash(&self) -> String {
        content_hash(&self.content)
    }
}

impl RecordMetadata {
    /// Build metadata; the score is rounded to two decimals.
    pub fn new(
        tags: BTreeSet<String>,
        project: impl Into<String>,
        git_branch: Option<String>,
        significance_score: f64,
    ) -> Self {
        Self {
            tags,
            project: project.into(),
            git_branch,
            significance_score: (significance_score * 100.0).round() / 100.0,
        }
    }
}
