//! The storage-provider capability contract
//!
//! A provider is a standalone value that knows whether it can serve a
//! resolved reference and how to fetch its bytes. Dispatch across providers
//! is the [`crate::StorageManager`]'s job; providers never consult each
//! other.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use codex_refs::ResolvedReference;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Default fetch deadline
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default content byte ceiling (10 MiB)
pub const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Options applied to a single fetch.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Deadline after which the fetch surfaces as a timeout
    pub timeout: Duration,
    /// Byte ceiling, checked against the length estimate and the downloaded
    /// body
    pub max_bytes: u64,
    /// Branch to fetch from, for providers that support branch selection
    pub branch: Option<String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_bytes: DEFAULT_MAX_BYTES,
            branch: None,
        }
    }
}

/// Bytes plus typed metadata returned by a provider fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResult {
    /// Raw content bytes
    pub content: Vec<u8>,
    /// MIME type, inferred or reported by the source
    pub content_type: String,
    /// Content size in bytes
    pub size: u64,
    /// Name of the provider that produced this result
    pub source: String,
    /// Entity tag reported by the source, when available
    pub etag: Option<String>,
    /// Last-modified timestamp reported by the source, when available
    pub last_modified: Option<DateTime<Utc>>,
    /// Whether this result was served from the cache layer
    pub from_cache: bool,
    /// Provider-specific metadata
    pub metadata: HashMap<String, Value>,
}

impl FetchResult {
    /// Build a result over raw bytes, deriving the size.
    pub fn new(content: Vec<u8>, content_type: impl Into<String>, source: impl Into<String>) -> Self {
        let size = content.len() as u64;
        Self {
            content,
            content_type: content_type.into(),
            size,
            source: source.into(),
            etag: None,
            last_modified: None,
            from_cache: false,
            metadata: HashMap::new(),
        }
    }

    /// Content decoded as UTF-8, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}

/// Capability contract implemented by every storage backend.
///
/// `can_handle` must be cheap: the manager calls it on every provider in
/// priority order and dispatches to the first that accepts. A provider that
/// accepted a reference owns the outcome; failures propagate instead of
/// falling through to lower-priority providers.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Stable provider name, recorded as the fetch source.
    fn name(&self) -> &'static str;

    /// Whether this provider can serve the given reference.
    fn can_handle(&self, reference: &ResolvedReference) -> bool;

    /// Fetch the referenced content.
    async fn fetch(&self, reference: &ResolvedReference, options: &FetchOptions) -> Result<FetchResult>;

    /// Check for existence without transferring content.
    ///
    /// The default implementation performs a full fetch; network providers
    /// override this with a header-only probe.
    async fn exists(&self, reference: &ResolvedReference) -> Result<bool> {
        match self.fetch(reference, &FetchOptions::default()).await {
            Ok(_) => Ok(true),
            Err(crate::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
