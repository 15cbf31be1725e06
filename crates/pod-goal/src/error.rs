// error.rs — Error types for goal storage.

use thiserror::Error;

/// Errors that can occur while reading or writing goal records.
#[derive(Debug, Error)]
pub enum GoalError {
    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: String,
        source: std::io::Error,
    },

    /// Failed to serialize/deserialize goal data.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A store mutex was poisoned by a panicking writer.
    #[error("goal store lock poisoned: {0}")]
    LockPoisoned(String),
}
