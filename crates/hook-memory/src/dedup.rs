//! Duplicate detection over the recent queue history.

use crate::schema::MemoryRecord;
use crate::storage::QueueStore;
use sha2::{Digest, Sha256};

/// Number of most recent queue entries checked for collisions.
pub const DEDUP_WINDOW: usize = 20;

/// SHA-256 of the content, hex encoded.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Whether `content` hashes equal to any record in `recent`.
pub fn is_duplicate(content: &str, recent: &[MemoryRecord]) -> bool {
    let hash = content_hash(content);
    recent.iter().any(|record| record.content_hash() == hash)
}

/// Check `content` against the last `window` records of `store`.
///
/// Fails open: if the history cannot be read the content is treated as new.
pub fn seen_recently(store: &impl QueueStore, content: &str, window: usize) -> bool {
    match store.tail_records(window) {
        Ok(recent) => is_duplicate(content, &recent),
        Err(e) => {
            tracing::warn!("dedup lookback failed, treating as new: {}", e);
            false
        }
    }
}
