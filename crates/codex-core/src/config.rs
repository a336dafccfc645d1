//! Configuration consumed by the engine
//!
//! These types are consumed, not owned: discovery, layering, and migration
//! of configuration files belong to collaborators. The engine only needs a
//! deserialized document — `load_yaml` is the thin adapter for callers that
//! already hold the text.

use std::path::PathBuf;

use codex_sync::RoutingRules;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default TTL applied when neither the request nor the type table decides
pub const DEFAULT_TTL_SECONDS: u64 = 3600;

/// Default worker-pool bound for organization-wide sync
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// A storage provider in priority order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProviderConfig {
    /// Current project checkout
    Local,
    /// Hosted repository raw content
    Github {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        branch: Option<String>,
    },
    /// Generic HTTP mirror fallback
    Http { base_url: String },
}

/// Sync-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Routing rule set handed to the evaluator
    #[serde(default)]
    pub rules: RoutingRules,
    /// Path globs excluded from every sync before routing runs
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Worker-pool bound for organization-wide runs
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            rules: RoutingRules::default(),
            exclude: Vec::new(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

/// Top-level configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodexConfig {
    /// Organization slug the caller operates under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    /// Cache root; defaults to `~/.codex/cache`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_root: Option<PathBuf>,
    /// TTL applied when no per-request override is given
    #[serde(default = "default_ttl")]
    pub default_ttl_seconds: u64,
    /// Providers in priority order; empty means local-then-github
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
    #[serde(default)]
    pub sync: SyncConfig,
}

impl Default for CodexConfig {
    fn default() -> Self {
        Self {
            organization: None,
            cache_root: None,
            default_ttl_seconds: DEFAULT_TTL_SECONDS,
            providers: Vec::new(),
            sync: SyncConfig::default(),
        }
    }
}

fn default_ttl() -> u64 {
    DEFAULT_TTL_SECONDS
}

impl CodexConfig {
    /// Deserialize a YAML configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the document does not match the
    /// schema.
    pub fn load_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| Error::Config {
            message: e.to_string(),
        })
    }

    /// The cache root to use: the configured one, or `~/.codex/cache`.
    pub fn effective_cache_root(&self) -> PathBuf {
        self.cache_root.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".codex")
                .join("cache")
        })
    }

    /// Providers in priority order, with the default stack when none are
    /// configured.
    pub fn effective_providers(&self) -> Vec<ProviderConfig> {
        if self.providers.is_empty() {
            vec![
                ProviderConfig::Local,
                ProviderConfig::Github {
                    token: None,
                    branch: None,
                },
            ]
        } else {
            self.providers.clone()
        }
    }
}
