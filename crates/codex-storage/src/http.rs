//! Generic HTTP provider
//!
//! The lowest-priority fallback: maps every reference onto a configured
//! base URL (`{base}/{org}/{project}/{path}`) and fetches it over plain
//! HTTP(S). Exposes a header-only existence probe so higher layers can test
//! presence without paying for a body transfer.

use async_trait::async_trait;
use codex_refs::ResolvedReference;
use serde_json::json;

use crate::content_type::content_type_for_path;
use crate::error::{Error, Result};
use crate::provider::{FetchOptions, FetchResult, StorageProvider};

/// Fallback provider for arbitrary HTTP content mirrors.
#[derive(Debug)]
pub struct HttpStorage {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStorage {
    /// Create a provider rooted at `base_url` (trailing slashes stripped).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn build_url(&self, reference: &ResolvedReference) -> String {
        let r = &reference.reference;
        match r.path.as_deref() {
            Some(path) => format!("{}/{}/{}/{}", self.base_url, r.organization, r.project, path),
            None => format!("{}/{}/{}", self.base_url, r.organization, r.project),
        }
    }

    fn map_send_error(uri: &str, timeout_secs: f64, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout {
                uri: uri.to_string(),
                seconds: timeout_secs,
            }
        } else {
            Error::provider("http", uri, e.to_string())
        }
    }
}

#[async_trait]
impl StorageProvider for HttpStorage {
    fn name(&self) -> &'static str {
        "http"
    }

    /// Handles everything; priority ordering keeps it last.
    fn can_handle(&self, _reference: &ResolvedReference) -> bool {
        true
    }

    async fn fetch(
        &self,
        reference: &ResolvedReference,
        options: &FetchOptions,
    ) -> Result<FetchResult> {
        let uri = reference.reference.uri.clone();
        let url = self.build_url(reference);
        let timeout_secs = options.timeout.as_secs_f64();

        tracing::debug!(%uri, %url, "fetching over http");

        let response = self
            .client
            .get(&url)
            .timeout(options.timeout)
            .send()
            .await
            .map_err(|e| Self::map_send_error(&uri, timeout_secs, e))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::not_found(&uri));
        }
        if !status.is_success() {
            return Err(Error::provider(
                "http",
                &uri,
                format!("unexpected status {status}"),
            ));
        }

        if let Some(length) = response.content_length()
            && length > options.max_bytes
        {
            return Err(Error::TooLarge {
                uri,
                size: length,
                limit: options.max_bytes,
            });
        }

        let reported_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .map_err(|e| Self::map_send_error(&uri, timeout_secs, e))?;
        if body.len() as u64 > options.max_bytes {
            return Err(Error::TooLarge {
                uri,
                size: body.len() as u64,
                limit: options.max_bytes,
            });
        }

        let content_type = reported_type.unwrap_or_else(|| {
            reference
                .reference
                .path
                .as_deref()
                .map(content_type_for_path)
                .unwrap_or(crate::content_type::DEFAULT_CONTENT_TYPE)
                .to_string()
        });

        let mut result = FetchResult::new(body.to_vec(), content_type, self.name());
        result.metadata.insert("url".to_string(), json!(url));
        Ok(result)
    }

    /// Lightweight header-only probe; true on any 2xx status.
    async fn exists(&self, reference: &ResolvedReference) -> Result<bool> {
        let uri = &reference.reference.uri;
        let url = self.build_url(reference);

        let response = self
            .client
            .head(&url)
            .send()
            .await
            .map_err(|e| Self::map_send_error(uri, 0.0, e))?;
        Ok(response.status().is_success())
    }
}
