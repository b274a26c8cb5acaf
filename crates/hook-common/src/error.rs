//! Hook error types.

use thiserror::Error;

/// Errors shared by the hook crates.
#[derive(Error, Debug)]
pub enum HookError {
    /// Context document missing, unreadable, or not valid JSON
    #[error("Malformed input from {origin}: {reason}")]
    MalformedInput { origin: String, reason: String },

    /// Queue history could not be read
    #[error("Failed to read queue {path}: {reason}")]
    QueueRead { path: String, reason: String },

    /// Record could not be appended to the queue
    #[error("Failed to write queue {path}: {reason}")]
    QueueWrite { path: String, reason: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HookError {
    pub fn malformed(origin: impl Into<String>, reason: impl ToString) -> Self {
        Self::MalformedInput {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }

    pub fn queue_read(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::QueueRead {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn queue_write(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::QueueWrite {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for hook operations
pub type Result<T> = std::result::Result<T, HookError>;
