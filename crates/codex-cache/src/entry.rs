//! Cache entry model and the freshness ladder
//!
//! An entry's status is derived from wall-clock time, never stored: `fresh`
//! until `expires_at`, then `stale` for a five-minute grace window, then
//! `expired`. Entries are replaced on refresh, not merged; only the access
//! statistics mutate in place.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use codex_storage::FetchResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Grace window during which an expired entry is still served while a
/// background revalidation runs
pub const STALE_WINDOW_SECS: i64 = 300;

/// Derived freshness of a cache entry at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Freshness {
    /// Within TTL; serve directly
    Fresh,
    /// Past TTL but inside the grace window; serve and revalidate
    Stale,
    /// Past the grace window; treat as absent
    Expired,
}

/// Persisted metadata for a cache entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryMetadata {
    /// The URI this entry caches
    pub uri: String,
    /// When the content was fetched
    pub cached_at: DateTime<Utc>,
    /// When the entry leaves the fresh state
    pub expires_at: DateTime<Utc>,
    /// TTL used to derive `expires_at`
    pub ttl_seconds: u64,
    /// Fast content hash (`blake3:<hex>`), used only for change detection
    pub content_hash: String,
    /// Content size in bytes
    pub size: u64,
    /// MIME type of the content
    pub content_type: String,
    /// Name of the provider that produced the content
    pub source: String,
    /// Number of cache reads served from this entry
    pub access_count: u64,
    /// Timestamp of the most recent read
    pub last_accessed_at: DateTime<Utc>,
    /// Entity tag reported by the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// Last-modified timestamp reported by the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    /// Provider-specific metadata carried through from the fetch
    #[serde(default)]
    pub provider_metadata: HashMap<String, Value>,
}

/// A cached document: metadata plus raw content bytes.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub metadata: EntryMetadata,
    pub content: Vec<u8>,
}

impl CacheEntry {
    /// Construct an entry from a fetch result, stamping `cached_at` now.
    pub fn from_fetch(uri: impl Into<String>, result: &FetchResult, ttl_seconds: u64) -> Self {
        let now = Utc::now();
        let metadata = EntryMetadata {
            uri: uri.into(),
            cached_at: now,
            expires_at: now + Duration::seconds(ttl_seconds as i64),
            ttl_seconds,
            content_hash: content_hash(&result.content),
            size: result.content.len() as u64,
            content_type: result.content_type.clone(),
            source: result.source.clone(),
            access_count: 0,
            last_accessed_at: now,
            etag: result.etag.clone(),
            last_modified: result.last_modified,
            provider_metadata: result.metadata.clone(),
        };
        Self {
            metadata,
            content: result.content.clone(),
        }
    }

    /// Derive the freshness status at `now`.
    pub fn status_at(&self, now: DateTime<Utc>) -> Freshness {
        if now < self.metadata.expires_at {
            Freshness::Fresh
        } else if now < self.metadata.expires_at + Duration::seconds(STALE_WINDOW_SECS) {
            Freshness::Stale
        } else {
            Freshness::Expired
        }
    }

    /// Derive the freshness status against the wall clock.
    pub fn status(&self) -> Freshness {
        self.status_at(Utc::now())
    }

    /// Seconds since the content was fetched.
    pub fn age_seconds(&self) -> i64 {
        (Utc::now() - self.metadata.cached_at).num_seconds()
    }

    /// Record a cache read.
    pub fn record_access(&mut self) {
        self.metadata.access_count += 1;
        self.metadata.last_accessed_at = Utc::now();
    }

    /// Convert back into a fetch result, marking it as cache-served.
    pub fn to_result(&self, stale: bool) -> FetchResult {
        let mut metadata = self.metadata.provider_metadata.clone();
        metadata.insert("cache_age_seconds".to_string(), self.age_seconds().into());
        metadata.insert("cache_hits".to_string(), self.metadata.access_count.into());
        if stale {
            metadata.insert("stale".to_string(), true.into());
        }

        FetchResult {
            content: self.content.clone(),
            content_type: self.metadata.content_type.clone(),
            size: self.metadata.size,
            source: self.metadata.source.clone(),
            etag: self.metadata.etag.clone(),
            last_modified: self.metadata.last_modified,
            from_cache: true,
            metadata,
        }
    }
}

/// Fast non-identity content hash in the canonical `blake3:<hex>` format.
///
/// Used for change detection only; nothing addresses content by this hash.
pub fn content_hash(content: &[u8]) -> String {
    format!("blake3:{}", blake3::hash(content).to_hex())
}
