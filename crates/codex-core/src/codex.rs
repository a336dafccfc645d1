//! The `Codex` facade
//!
//! Wires resolver, storage providers, and the cache layer together from a
//! configuration document. Ambient project identity is injected at
//! construction; the facade never detects it implicitly.

use codex_cache::{CacheManager, CacheStats, CacheStore, TtlPolicy};
use codex_refs::{ProjectContext, Reference, Resolver};
use codex_storage::{
    FetchOptions, FetchResult, GitHubStorage, HttpStorage, LocalStorage, StorageManager,
};
use codex_sync::{FileEntry, OrgSyncRunner, RoutingRules, SyncEndpoints, SyncOptions, SyncPlan};

use crate::config::{CodexConfig, ProviderConfig};
use crate::error::Result;

/// High-level entry point over resolution, storage, and caching.
pub struct Codex {
    resolver: Resolver,
    cache: CacheManager,
    context: Option<ProjectContext>,
    sync_rules: RoutingRules,
    sync_exclude: Vec<String>,
    max_concurrency: usize,
}

impl Codex {
    /// Build from configuration, constructing the provider stack it names.
    ///
    /// Must be called inside a Tokio runtime (the cache layer spawns its
    /// revalidation writer task).
    pub fn new(config: CodexConfig, context: Option<ProjectContext>) -> Result<Self> {
        let mut storage = StorageManager::new();
        for provider in config.effective_providers() {
            match provider {
                ProviderConfig::Local => storage.register(Box::new(LocalStorage::new())),
                ProviderConfig::Github { token, branch } => {
                    let mut github = GitHubStorage::new();
                    if let Some(token) = token {
                        github = github.with_token(token);
                    }
                    if let Some(branch) = branch {
                        github = github.with_default_branch(branch);
                    }
                    storage.register(Box::new(github));
                }
                ProviderConfig::Http { base_url } => {
                    storage.register(Box::new(HttpStorage::new(base_url)));
                }
            }
        }
        Self::with_storage(config, storage, context)
    }

    /// Build over an explicit storage manager. Used by tests and by
    /// callers that assemble their own provider stack.
    pub fn with_storage(
        config: CodexConfig,
        storage: StorageManager,
        context: Option<ProjectContext>,
    ) -> Result<Self> {
        let cache_root = config.effective_cache_root();
        tracing::debug!(cache_root = %cache_root.display(), providers = ?storage.provider_names(), "initializing codex");

        let resolver = Resolver::new(&cache_root);
        let store = CacheStore::open(&cache_root)?;
        let cache = CacheManager::new(
            store,
            storage,
            TtlPolicy::new(config.default_ttl_seconds),
        );

        Ok(Self {
            resolver,
            cache,
            context,
            sync_rules: config.sync.rules,
            sync_exclude: config.sync.exclude,
            max_concurrency: config.sync.max_concurrency,
        })
    }

    /// The injected ambient project identity, if any.
    pub fn context(&self) -> Option<&ProjectContext> {
        self.context.as_ref()
    }

    /// Fetch a document through the cache with default options.
    pub async fn fetch(&self, uri: &str) -> Result<FetchResult> {
        self.fetch_with(uri, &FetchOptions::default()).await
    }

    /// Fetch a document through the cache.
    ///
    /// # Errors
    ///
    /// Malformed URIs, provider failures, byte-ceiling violations, and
    /// timeouts all surface here; background revalidation failures never
    /// do.
    pub async fn fetch_with(&self, uri: &str, options: &FetchOptions) -> Result<FetchResult> {
        let reference = Reference::parse(uri)?;
        let resolved = self
            .resolver
            .resolve_reference(reference, self.context.as_ref());
        Ok(self.cache.get(&resolved, options).await?)
    }

    /// Drop one cached document.
    pub async fn invalidate(&self, uri: &str) -> Result<bool> {
        Ok(self.cache.invalidate(uri).await?)
    }

    /// Drop every cached document whose URI matches the regex; returns the
    /// removed count.
    pub async fn invalidate_pattern(&self, pattern: &str) -> Result<usize> {
        Ok(self.cache.invalidate_pattern(pattern).await?)
    }

    /// Point-in-time cache statistics.
    pub async fn stats(&self) -> Result<CacheStats> {
        Ok(self.cache.stats().await?)
    }

    /// Remove expired cache entries; returns the removed count.
    pub async fn cleanup(&self) -> Result<usize> {
        Ok(self.cache.cleanup().await?)
    }

    /// Plan a sync between two inventories under the configured rules.
    pub fn plan_sync(
        &self,
        source_files: &[FileEntry],
        target_files: &[FileEntry],
        endpoints: &SyncEndpoints,
        options: &SyncOptions,
    ) -> SyncPlan {
        let mut options = options.clone();
        options
            .exclude
            .extend(self.sync_exclude.iter().cloned());
        codex_sync::plan(
            source_files,
            target_files,
            endpoints,
            &options,
            &self.sync_rules,
        )
    }

    /// A runner for organization-wide sync planning, bounded by the
    /// configured concurrency.
    pub fn sync_runner(&self, options: SyncOptions) -> OrgSyncRunner {
        OrgSyncRunner::new(self.max_concurrency, options, self.sync_rules.clone())
    }
}
