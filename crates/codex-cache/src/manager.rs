//! Cache manager: the TTL layer over storage dispatch
//!
//! Per-entry state machine: `absent → fresh → stale → expired → absent`,
//! driven purely by wall-clock comparison against `expires_at` and the
//! stale window. A fresh entry is served directly; a stale entry is served
//! immediately while a detached revalidation refetches it; an expired or
//! absent entry is fetched synchronously. Revalidation outcomes reach the
//! persisted store over a channel consumed by a single writer task, so the
//! store's one-writer-per-key contract stays simple.

use std::collections::HashMap;
use std::sync::Arc;

use codex_refs::{Reference, ResolvedReference};
use codex_storage::{FetchOptions, FetchResult, StorageManager};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, mpsc};

use crate::entry::{CacheEntry, Freshness};
use crate::error::{Error, Result};
use crate::store::CacheStore;
use crate::ttl::TtlPolicy;

/// Point-in-time cache statistics.
///
/// Freshness counts are derived by scanning entries' status at snapshot
/// time, never stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    /// Persisted entries
    pub entry_count: usize,
    /// Entries currently held in the memory layer
    pub memory_entries: usize,
    /// Bytes held in the memory layer
    pub memory_size: u64,
    /// Bytes persisted on disk
    pub total_size: u64,
    /// Entries currently fresh
    pub fresh_count: usize,
    /// Entries currently inside the stale window
    pub stale_count: usize,
    /// Entries past the stale window
    pub expired_count: usize,
}

/// TTL cache over a [`StorageManager`].
///
/// Must be constructed inside a Tokio runtime: creation spawns the writer
/// task that applies background-revalidation results.
pub struct CacheManager {
    store: Arc<CacheStore>,
    storage: Arc<StorageManager>,
    memory: Arc<RwLock<HashMap<String, CacheEntry>>>,
    ttl_policy: TtlPolicy,
    revalidated_tx: mpsc::UnboundedSender<CacheEntry>,
}

impl CacheManager {
    /// Create a manager over a persisted store and a storage dispatcher.
    pub fn new(store: CacheStore, storage: StorageManager, ttl_policy: TtlPolicy) -> Self {
        let store = Arc::new(store);
        let storage = Arc::new(storage);
        let memory: Arc<RwLock<HashMap<String, CacheEntry>>> =
            Arc::new(RwLock::new(HashMap::new()));

        let (revalidated_tx, mut revalidated_rx) = mpsc::unbounded_channel::<CacheEntry>();

        // Single writer for revalidation outcomes. Ends when the manager
        // (the only sender) drops.
        let writer_store = Arc::clone(&store);
        let writer_memory = Arc::clone(&memory);
        tokio::spawn(async move {
            while let Some(entry) = revalidated_rx.recv().await {
                let uri = entry.metadata.uri.clone();
                match writer_store.put(&entry).await {
                    Ok(()) => {
                        writer_memory.write().await.insert(uri.clone(), entry);
                        tracing::debug!(%uri, "revalidation updated cache entry");
                    }
                    Err(e) => {
                        tracing::warn!(%uri, error = %e, "failed to persist revalidated entry");
                    }
                }
            }
        });

        Self {
            store,
            storage,
            memory,
            ttl_policy,
            revalidated_tx,
        }
    }

    /// Fetch through the cache.
    ///
    /// Serves fresh entries directly, serves stale entries immediately
    /// while revalidating in the background, and fetches synchronously for
    /// expired or absent entries.
    ///
    /// # Errors
    ///
    /// A synchronous fetch failure propagates; background revalidation
    /// failures never surface here.
    pub async fn get(
        &self,
        reference: &ResolvedReference,
        options: &FetchOptions,
    ) -> Result<FetchResult> {
        let uri = reference.reference.uri.clone();

        let entry = self.lookup(&uri).await?;
        match entry {
            Some(mut entry) => match entry.status() {
                Freshness::Fresh => {
                    tracing::debug!(%uri, "cache hit");
                    entry.record_access();
                    self.persist(entry.clone()).await?;
                    Ok(entry.to_result(false))
                }
                Freshness::Stale => {
                    tracing::debug!(%uri, "stale cache hit, revalidating in background");
                    entry.record_access();
                    self.persist(entry.clone()).await?;
                    self.spawn_revalidation(reference.clone(), options.clone(), &entry);
                    Ok(entry.to_result(true))
                }
                Freshness::Expired => {
                    tracing::debug!(%uri, "cache entry expired, refetching");
                    self.fetch_and_store(reference, options).await
                }
            },
            None => {
                tracing::debug!(%uri, "cache miss");
                self.fetch_and_store(reference, options).await
            }
        }
    }

    /// Store a fetch result, superseding any previous entry for the URI.
    pub async fn set(
        &self,
        uri: &str,
        result: &FetchResult,
        ttl_override: Option<u64>,
    ) -> Result<()> {
        let reference = Reference::parse(uri).map_err(codex_storage::Error::from)?;
        let ttl =
            ttl_override.unwrap_or_else(|| self.ttl_policy.ttl_for(reference.path.as_deref()));
        let entry = CacheEntry::from_fetch(&reference.uri, result, ttl);
        self.persist(entry).await
    }

    /// Drop a single entry. Returns whether anything was removed.
    pub async fn invalidate(&self, uri: &str) -> Result<bool> {
        self.memory.write().await.remove(uri);
        self.store.delete(uri).await
    }

    /// Drop every entry whose URI matches the regex; returns the count
    /// removed from the persisted store.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPattern`] when the regex does not compile.
    pub async fn invalidate_pattern(&self, pattern: &str) -> Result<usize> {
        let regex = Regex::new(pattern).map_err(|e| Error::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

        let mut count = 0;
        for uri in self.store.uris().await? {
            if regex.is_match(&uri) && self.store.delete(&uri).await? {
                count += 1;
            }
        }
        self.memory
            .write()
            .await
            .retain(|uri, _| !regex.is_match(uri));

        tracing::debug!(%pattern, count, "invalidated cache entries");
        Ok(count)
    }

    /// Point-in-time statistics snapshot.
    pub async fn stats(&self) -> Result<CacheStats> {
        let mut stats = CacheStats::default();

        for entry in self.store.entries().await? {
            stats.entry_count += 1;
            stats.total_size += entry.metadata.size;
            match entry.status() {
                Freshness::Fresh => stats.fresh_count += 1,
                Freshness::Stale => stats.stale_count += 1,
                Freshness::Expired => stats.expired_count += 1,
            }
        }

        let memory = self.memory.read().await;
        stats.memory_entries = memory.len();
        stats.memory_size = memory.values().map(|e| e.metadata.size).sum();

        Ok(stats)
    }

    /// Remove expired entries from both layers; returns the persisted
    /// count removed.
    pub async fn cleanup(&self) -> Result<usize> {
        let removed = self.store.clear_expired().await?;
        self.memory
            .write()
            .await
            .retain(|_, entry| entry.status() != Freshness::Expired);
        Ok(removed)
    }

    /// Drop everything; returns the persisted count removed.
    pub async fn clear(&self) -> Result<usize> {
        self.memory.write().await.clear();
        self.store.clear().await
    }

    async fn lookup(&self, uri: &str) -> Result<Option<CacheEntry>> {
        if let Some(entry) = self.memory.read().await.get(uri) {
            return Ok(Some(entry.clone()));
        }
        let loaded = self.store.get(uri).await?;
        if let Some(entry) = &loaded {
            self.memory
                .write()
                .await
                .insert(uri.to_string(), entry.clone());
        }
        Ok(loaded)
    }

    async fn persist(&self, entry: CacheEntry) -> Result<()> {
        self.store.put(&entry).await?;
        self.memory
            .write()
            .await
            .insert(entry.metadata.uri.clone(), entry);
        Ok(())
    }

    async fn fetch_and_store(
        &self,
        reference: &ResolvedReference,
        options: &FetchOptions,
    ) -> Result<FetchResult> {
        let result = self.storage.fetch(reference, options).await?;
        let ttl = self
            .ttl_policy
            .ttl_for(reference.reference.path.as_deref());
        let entry = CacheEntry::from_fetch(&reference.reference.uri, &result, ttl);
        self.persist(entry).await?;
        Ok(result)
    }

    /// Fire-and-forget revalidation of a stale entry.
    ///
    /// Success flows to the writer task over the channel; failure is
    /// logged and dropped — the caller already has the stale value.
    fn spawn_revalidation(
        &self,
        reference: ResolvedReference,
        options: FetchOptions,
        entry: &CacheEntry,
    ) {
        let storage = Arc::clone(&self.storage);
        let tx = self.revalidated_tx.clone();
        let ttl = entry.metadata.ttl_seconds;

        tokio::spawn(async move {
            let uri = reference.reference.uri.clone();
            match storage.fetch(&reference, &options).await {
                Ok(result) => {
                    let entry = CacheEntry::from_fetch(&uri, &result, ttl);
                    // Receiver gone means the manager is shutting down.
                    let _ = tx.send(entry);
                }
                Err(e) => {
                    tracing::warn!(%uri, error = %e, "background revalidation failed");
                }
            }
        });
    }
}
