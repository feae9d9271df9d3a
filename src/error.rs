//! Error types for persistence
//!
//! Nothing in the game loop is allowed to fail: callers log these and fall
//! back to defaults.

/// Errors raised by a [`crate::persistence::KeyValueStore`] or the JSON
/// helpers layered on top of it.
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("Storage unavailable")]
    Unavailable,

    #[error("Failed to write key {key}: {reason}")]
    Write { key: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Malformed value for key {key}: {source}")]
    Parse {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
