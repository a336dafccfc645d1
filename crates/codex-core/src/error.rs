//! Error types for codex-core

/// Result type for codex-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the orchestration layer
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration document is structurally invalid
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// Reference error from codex-refs
    #[error(transparent)]
    Refs(#[from] codex_refs::Error),

    /// Storage error from codex-storage
    #[error(transparent)]
    Storage(#[from] codex_storage::Error),

    /// Cache error from codex-cache
    #[error(transparent)]
    Cache(#[from] codex_cache::Error),

    /// Routing/planning error from codex-sync
    #[error(transparent)]
    Sync(#[from] codex_sync::Error),
}
