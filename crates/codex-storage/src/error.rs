//! Error types for codex-storage

/// Result type for codex-storage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while fetching content
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No provider could handle the reference, or the source returned 404
    #[error("Not found: {uri}")]
    NotFound { uri: String },

    /// Content exceeds the configured byte ceiling
    #[error("Content too large for {uri}: {size} bytes (limit {limit})")]
    TooLarge { uri: String, size: u64, limit: u64 },

    /// The fetch deadline elapsed
    #[error("Timed out fetching {uri} after {seconds:.1}s")]
    Timeout { uri: String, seconds: f64 },

    /// Provider-specific failure that is none of the above
    #[error("{provider} provider failed for {uri}: {message}")]
    Provider {
        provider: &'static str,
        uri: String,
        message: String,
    },

    /// Reference error from codex-refs
    #[error(transparent)]
    Refs(#[from] codex_refs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn not_found(uri: impl Into<String>) -> Self {
        Self::NotFound { uri: uri.into() }
    }

    pub fn provider(
        provider: &'static str,
        uri: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Provider {
            provider,
            uri: uri.into(),
            message: message.into(),
        }
    }
}
