//! Error types for codex-cache

use std::path::PathBuf;

/// Result type for codex-cache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in cache operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed regex supplied to pattern invalidation
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Advisory lock could not be acquired for a cache file
    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },

    /// I/O failure against the persisted store
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Storage error surfaced by a synchronous fetch
    #[error(transparent)]
    Storage(#[from] codex_storage::Error),

    /// Metadata serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
