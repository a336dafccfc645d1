//! TTL cache layer with disk persistence for Codex Manager
//!
//! Wraps storage dispatch with a three-state freshness ladder:
//!
//! - **fresh** — within TTL, served directly
//! - **stale** — past TTL but inside a five-minute grace window, served
//!   immediately while a background revalidation refetches
//! - **expired** — past the window, fetched synchronously
//!
//! Entries persist under `{root}/{organization}/{project}/{path}` with a
//! JSON metadata sidecar; the in-memory layer in front of the store keeps
//! repeat reads cheap.

pub mod entry;
pub mod error;
pub mod manager;
pub mod store;
pub mod ttl;

pub use entry::{CacheEntry, EntryMetadata, Freshness, STALE_WINDOW_SECS, content_hash};
pub use error::{Error, Result};
pub use manager::{CacheManager, CacheStats};
pub use store::CacheStore;
pub use ttl::{DEFAULT_TTL_SECS, TtlPolicy};
