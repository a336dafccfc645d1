//! Error types for codex-refs

/// Result type for codex-refs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing or validating references
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// URI does not follow the `codex://org/project[/path]` grammar
    #[error("Malformed URI '{uri}': {reason}")]
    MalformedUri { uri: String, reason: String },

    /// Organization or project segment failed name validation
    #[error("Invalid {field} name: '{value}'")]
    InvalidName { field: &'static str, value: String },

    /// Path contains traversal, absolute, or protocol components
    #[error("Unsafe path '{path}': {reason}")]
    UnsafePath { path: String, reason: String },
}

impl Error {
    pub fn malformed(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedUri {
            uri: uri.into(),
            reason: reason.into(),
        }
    }

    pub fn unsafe_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsafePath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
