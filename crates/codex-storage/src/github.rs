//! GitHub raw-content provider
//!
//! Fetches any codex reference from a hosted repository by mapping it to a
//! raw-content URL (`{base}/{org}/{project}/{branch}/{path}`). Supports
//! branch selection per fetch and optional token authentication for private
//! repositories.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use codex_refs::ResolvedReference;
use serde_json::json;

use crate::content_type::content_type_for_path;
use crate::error::{Error, Result};
use crate::provider::{FetchOptions, FetchResult, StorageProvider};

const RAW_BASE_URL: &str = "https://raw.githubusercontent.com";

/// Provider for hosted repository content.
#[derive(Debug)]
pub struct GitHubStorage {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    default_branch: String,
}

impl GitHubStorage {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: RAW_BASE_URL.to_string(),
            token: None,
            default_branch: "main".to_string(),
        }
    }

    /// Use a personal access token for private repositories.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Override the default branch (`main`).
    pub fn with_default_branch(mut self, branch: impl Into<String>) -> Self {
        self.default_branch = branch.into();
        self
    }

    /// Override the raw-content base URL. Intended for mirrors and tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_url(&self, reference: &ResolvedReference, branch: &str) -> Result<String> {
        let r = &reference.reference;
        let Some(path) = r.path.as_deref() else {
            return Err(Error::not_found(&r.uri));
        };
        Ok(format!(
            "{}/{}/{}/{}/{}",
            self.base_url, r.organization, r.project, branch, path
        ))
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, url);
        if let Some(token) = &self.token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder
    }

    fn map_send_error(uri: &str, timeout_secs: f64, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout {
                uri: uri.to_string(),
                seconds: timeout_secs,
            }
        } else {
            Error::provider("github", uri, e.to_string())
        }
    }
}

impl Default for GitHubStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageProvider for GitHubStorage {
    fn name(&self) -> &'static str {
        "github"
    }

    fn can_handle(&self, reference: &ResolvedReference) -> bool {
        reference.reference.path.is_some()
    }

    async fn fetch(
        &self,
        reference: &ResolvedReference,
        options: &FetchOptions,
    ) -> Result<FetchResult> {
        let uri = reference.reference.uri.clone();
        let branch = options
            .branch
            .clone()
            .unwrap_or_else(|| self.default_branch.clone());
        let url = self.build_url(reference, &branch)?;
        let timeout_secs = options.timeout.as_secs_f64();

        tracing::debug!(%uri, %url, %branch, "fetching from github");

        let response = self
            .request(reqwest::Method::GET, &url)
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
                "github",
                &uri,
                format!("unexpected status {status}"),
            ));
        }

        // Length estimate first, then the downloaded body.
        if let Some(length) = response.content_length()
            && length > options.max_bytes
        {
            return Err(Error::TooLarge {
                uri,
                size: length,
                limit: options.max_bytes,
            });
        }

        let etag = header_string(&response, "etag");
        let last_modified = header_string(&response, "last-modified")
            .as_deref()
            .and_then(parse_http_date);

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

        let content_type = reference
            .reference
            .path
            .as_deref()
            .map(content_type_for_path)
            .unwrap_or(crate::content_type::DEFAULT_CONTENT_TYPE);

        let mut result = FetchResult::new(body.to_vec(), content_type, self.name());
        result.etag = etag;
        result.last_modified = last_modified;
        result.metadata.insert("url".to_string(), json!(url));
        result.metadata.insert("branch".to_string(), json!(branch));
        Ok(result)
    }

    /// Header-only probe against the raw-content URL.
    async fn exists(&self, reference: &ResolvedReference) -> Result<bool> {
        let uri = &reference.reference.uri;
        let url = self.build_url(reference, &self.default_branch)?;

        let response = self
            .request(reqwest::Method::HEAD, &url)
            .send()
            .await
            .map_err(|e| Self::map_send_error(uri, 0.0, e))?;
        Ok(response.status().is_success())
    }
}

fn header_string(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
