//! Memory queue for Claude Code hooks.
//!
//! Provides:
//! - Memory record schema
//! - Append-only JSONL queue with bounded tail reads
//! - Content hashing and duplicate detection

pub mod dedup;
pub mod schema;
pub mod storage;

pub use dedup::{DEDUP_WINDOW, content_hash, is_duplicate, seen_recently};
pub use schema::{MemoryRecord, RecordMetadata};
pub use storage::{InMemoryQueue, JsonlQueue, QueueStore};
