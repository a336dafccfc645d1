//! Local filesystem provider
//!
//! Serves references that resolve into the ambient project checkout. The
//! resolver has already computed the local path; this provider only reads
//! it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use codex_refs::ResolvedReference;
use serde_json::json;

use crate::content_type::{DEFAULT_CONTENT_TYPE, content_type_for_path};
use crate::error::{Error, Result};
use crate::provider::{FetchOptions, FetchResult, StorageProvider};

/// Provider for documents inside the current project checkout.
#[derive(Debug, Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StorageProvider for LocalStorage {
    fn name(&self) -> &'static str {
        "local"
    }

    fn can_handle(&self, reference: &ResolvedReference) -> bool {
        reference
            .local_path
            .as_ref()
            .is_some_and(|path| path.is_file())
    }

    async fn fetch(
        &self,
        reference: &ResolvedReference,
        options: &FetchOptions,
    ) -> Result<FetchResult> {
        let uri = &reference.reference.uri;
        let Some(path) = reference.local_path.as_ref() else {
            return Err(Error::not_found(uri));
        };

        let meta = match tokio::fs::metadata(path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::not_found(uri));
            }
            Err(e) => return Err(e.into()),
        };

        if meta.len() > options.max_bytes {
            return Err(Error::TooLarge {
                uri: uri.clone(),
                size: meta.len(),
                limit: options.max_bytes,
            });
        }

        let content = tokio::fs::read(path).await?;
        let last_modified = meta
            .modified()
            .ok()
            .map(DateTime::<Utc>::from);

        let content_type = reference
            .reference
            .path
            .as_deref()
            .map(content_type_for_path)
            .unwrap_or(DEFAULT_CONTENT_TYPE);

        let mut result = FetchResult::new(content, content_type, self.name());
        result.last_modified = last_modified;
        result
            .metadata
            .insert("path".to_string(), json!(path.display().to_string()));
        Ok(result)
    }
}
