//! File-backed persistence for cache entries
//!
//! Entries are addressed by `{root}/{organization}/{project}/{path}`: the
//! content bytes live at that path and the structured metadata in a `.meta`
//! JSON sidecar next to it. Writes go through write-temp-then-rename with
//! an advisory lock, and every key carries its own async lock so one
//! writer per key never blocks readers of other keys.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use codex_refs::Reference;
use tokio::sync::RwLock;

use crate::entry::{CacheEntry, EntryMetadata, Freshness, content_hash};
use crate::error::{Error, Result};

/// Sidecar extension for entry metadata
const META_SUFFIX: &str = ".meta";

/// File-backed cache entry store.
pub struct CacheStore {
    root: PathBuf,
    locks: Mutex<HashMap<String, Arc<RwLock<()>>>>,
}

impl CacheStore {
    /// Open (and create if needed) a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root: PathBuf = root.into();
        fs::create_dir_all(&root).map_err(|e| Error::io(&root, e))?;
        // Canonicalize so entry paths compare stably across callers.
        let root = dunce::canonicalize(&root).map_err(|e| Error::io(&root, e))?;
        Ok(Self {
            root,
            locks: Mutex::new(HashMap::new()),
        })
    }

    /// The canonicalized store root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_lock(&self, uri: &str) -> Arc<RwLock<()>> {
        let mut locks = self.locks.lock().expect("lock table poisoned");
        locks
            .entry(uri.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }

    /// Content and sidecar paths for a URI.
    fn paths_for(&self, uri: &str) -> Result<(PathBuf, PathBuf)> {
        let reference = Reference::parse(uri).map_err(codex_storage::Error::from)?;
        let mut content_path = self.root.join(&reference.organization).join(&reference.project);
        if let Some(path) = &reference.path {
            for segment in path.split('/') {
                content_path.push(segment);
            }
        }

        let file_name = content_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let meta_path = content_path.with_file_name(format!("{file_name}{META_SUFFIX}"));
        Ok((content_path, meta_path))
    }

    /// Read an entry, verifying its content hash.
    ///
    /// A corrupt or torn entry is deleted and reported as absent.
    pub async fn get(&self, uri: &str) -> Result<Option<CacheEntry>> {
        let (content_path, meta_path) = self.paths_for(uri)?;
        let lock = self.key_lock(uri);
        let guard = lock.read().await;

        if !content_path.is_file() || !meta_path.is_file() {
            return Ok(None);
        }

        let loaded = read_entry(&content_path, &meta_path);
        drop(guard);

        match loaded {
            Some(entry) => Ok(Some(entry)),
            None => {
                tracing::warn!(%uri, "dropping corrupt cache entry");
                self.delete(uri).await?;
                Ok(None)
            }
        }
    }

    /// Persist an entry, superseding any previous one for the same URI.
    pub async fn put(&self, entry: &CacheEntry) -> Result<()> {
        let (content_path, meta_path) = self.paths_for(&entry.metadata.uri)?;
        let lock = self.key_lock(&entry.metadata.uri);
        let _guard = lock.write().await;

        let meta_json = serde_json::to_vec_pretty(&entry.metadata)?;
        write_atomic(&content_path, &entry.content)?;
        write_atomic(&meta_path, &meta_json)?;
        Ok(())
    }

    /// Delete an entry. Returns whether anything was removed.
    pub async fn delete(&self, uri: &str) -> Result<bool> {
        let (content_path, meta_path) = self.paths_for(uri)?;
        let lock = self.key_lock(uri);
        let _guard = lock.write().await;

        let mut deleted = false;
        for path in [&content_path, &meta_path] {
            match fs::remove_file(path) {
                Ok(()) => deleted = true,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(Error::io(path, e)),
            }
        }

        // Prune now-empty directories up to the store root.
        let mut dir = content_path.parent().map(Path::to_path_buf);
        while let Some(current) = dir {
            if current == self.root || fs::remove_dir(&current).is_err() {
                break;
            }
            dir = current.parent().map(Path::to_path_buf);
        }

        Ok(deleted)
    }

    /// URIs of every persisted entry, in no particular order.
    pub async fn uris(&self) -> Result<Vec<String>> {
        Ok(self
            .scan_metadata()?
            .into_iter()
            .map(|meta| meta.uri)
            .collect())
    }

    /// Load every persisted entry, skipping corrupt ones.
    pub async fn entries(&self) -> Result<Vec<CacheEntry>> {
        let mut entries = Vec::new();
        for meta in self.scan_metadata()? {
            if let Some(entry) = self.get(&meta.uri).await? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    /// Delete every entry, returning the count removed.
    pub async fn clear(&self) -> Result<usize> {
        let mut count = 0;
        for uri in self.uris().await? {
            if self.delete(&uri).await? {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Delete entries past the stale window, returning the count removed.
    pub async fn clear_expired(&self) -> Result<usize> {
        let mut count = 0;
        for entry in self.entries().await? {
            if entry.status() == Freshness::Expired && self.delete(&entry.metadata.uri).await? {
                count += 1;
            }
        }
        Ok(count)
    }

    fn scan_metadata(&self) -> Result<Vec<EntryMetadata>> {
        let mut metas = Vec::new();
        let mut stack = vec![self.root.clone()];

        while let Some(dir) = stack.pop() {
            let read = match fs::read_dir(&dir) {
                Ok(read) => read,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(Error::io(&dir, e)),
            };
            for dir_entry in read {
                let dir_entry = dir_entry.map_err(|e| Error::io(&dir, e))?;
                let path = dir_entry.path();
                if path.is_dir() {
                    stack.push(path);
                } else if path.to_string_lossy().ends_with(META_SUFFIX) {
                    // Unreadable sidecars are skipped here and reaped by the
                    // hash check on the next get.
                    if let Ok(bytes) = fs::read(&path)
                        && let Ok(meta) = serde_json::from_slice::<EntryMetadata>(&bytes)
                    {
                        metas.push(meta);
                    }
                }
            }
        }

        Ok(metas)
    }
}

fn read_entry(content_path: &Path, meta_path: &Path) -> Option<CacheEntry> {
    let meta_bytes = fs::read(meta_path).ok()?;
    let metadata: EntryMetadata = serde_json::from_slice(&meta_bytes).ok()?;
    let content = fs::read(content_path).ok()?;

    if content_hash(&content) != metadata.content_hash {
        return None;
    }

    Some(CacheEntry { metadata, content })
}

/// Write content atomically with an advisory lock.
///
/// Write-to-temp-then-rename keeps readers from ever observing a partial
/// entry.
fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    fs2::FileExt::lock_exclusive(&temp_file).map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;
    temp_file
        .sync_all()
        .map_err(|e| Error::io(&temp_path, e))?;

    fs2::FileExt::unlock(&temp_file).map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;

    fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))?;
    Ok(())
}
