//! Error types for codex-sync

/// Result type for codex-sync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in routing and sync planning
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Front matter exists but is not valid YAML
    #[error("Invalid front matter: {message}")]
    Frontmatter { message: String },

    /// A plan holds conflicts that must be resolved manually
    #[error("Sync plan has {count} unresolved conflict(s), first: {first}")]
    Conflict { count: usize, first: String },
}
