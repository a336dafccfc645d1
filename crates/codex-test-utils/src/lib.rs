//! Shared test fixtures for the Codex Manager workspace
//!
//! Provides an in-memory storage provider with controllable failure modes
//! and a temp-directory cache root, so cache and orchestration tests run
//! deterministically without touching the network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use codex_refs::ResolvedReference;
use codex_storage::{Error, FetchOptions, FetchResult, Result, StorageProvider};

/// In-memory storage provider keyed by URI.
///
/// Accepts every reference; a missing document surfaces as `NotFound` and
/// the failure switch forces a provider error, which lets tests exercise
/// both fetch outcomes. Clones share state, so a test can keep a handle
/// while handing a boxed clone to a `StorageManager`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    failing: Arc<AtomicBool>,
    fetch_count: Arc<AtomicUsize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) a document body for a URI.
    pub fn insert(&self, uri: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.files
            .lock()
            .expect("files poisoned")
            .insert(uri.into(), content.into());
    }

    /// Remove a document.
    pub fn remove(&self, uri: &str) {
        self.files.lock().expect("files poisoned").remove(uri);
    }

    /// Force every subsequent fetch to fail with a provider error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of fetches attempted so far.
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StorageProvider for MemoryStorage {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn can_handle(&self, _reference: &ResolvedReference) -> bool {
        true
    }

    async fn fetch(
        &self,
        reference: &ResolvedReference,
        _options: &FetchOptions,
    ) -> Result<FetchResult> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        let uri = &reference.reference.uri;

        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::provider("memory", uri, "forced failure"));
        }

        let content = self
            .files
            .lock()
            .expect("files poisoned")
            .get(uri)
            .cloned()
            .ok_or_else(|| Error::not_found(uri))?;

        Ok(FetchResult::new(content, "text/markdown", self.name()))
    }
}

/// A resolved reference against a throwaway cache root, for tests that
/// don't care about resolution itself.
pub fn resolved(uri: &str) -> ResolvedReference {
    codex_refs::Resolver::new("/tmp/codex-test-cache")
        .resolve(uri, None)
        .expect("test URI must parse")
}

/// Temp directory helper that keeps the guard alive alongside the path.
pub struct TempCacheRoot {
    pub dir: tempfile::TempDir,
}

impl TempCacheRoot {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp cache root"),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        self.dir.path()
    }
}

impl Default for TempCacheRoot {
    fn default() -> Self {
        Self::new()
    }
}
