//! Priority-ordered provider dispatch
//!
//! The manager holds providers in priority order and hands each fetch to
//! the first provider whose `can_handle` accepts the reference. There is no
//! retry across providers: a failure from the chosen provider propagates.
//! Fallback is by priority and capability, not by retry-on-error.

use codex_refs::ResolvedReference;

use crate::error::{Error, Result};
use crate::provider::{FetchOptions, FetchResult, StorageProvider};

/// Ordered collection of storage providers.
pub struct StorageManager {
    providers: Vec<Box<dyn StorageProvider>>,
}

impl StorageManager {
    /// Create an empty manager. Register providers in priority order.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Append a provider at the lowest priority so far.
    pub fn register(&mut self, provider: Box<dyn StorageProvider>) {
        self.providers.push(provider);
    }

    /// Builder-style registration.
    pub fn with_provider(mut self, provider: Box<dyn StorageProvider>) -> Self {
        self.register(provider);
        self
    }

    /// Provider names in dispatch order.
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    fn select(&self, reference: &ResolvedReference) -> Option<&dyn StorageProvider> {
        self.providers
            .iter()
            .map(Box::as_ref)
            .find(|p| p.can_handle(reference))
    }

    /// Fetch via the first capable provider.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when no provider accepts the reference; any
    /// error from the chosen provider otherwise.
    pub async fn fetch(
        &self,
        reference: &ResolvedReference,
        options: &FetchOptions,
    ) -> Result<FetchResult> {
        let uri = &reference.reference.uri;
        let Some(provider) = self.select(reference) else {
            tracing::debug!(%uri, "no provider can handle reference");
            return Err(Error::not_found(uri));
        };

        tracing::debug!(%uri, provider = provider.name(), "dispatching fetch");
        provider.fetch(reference, options).await
    }

    /// Check existence via the first capable provider.
    pub async fn exists(&self, reference: &ResolvedReference) -> Result<bool> {
        match self.select(reference) {
            Some(provider) => provider.exists(reference).await,
            None => Ok(false),
        }
    }
}

impl Default for StorageManager {
    fn default() -> Self {
        Self::new()
    }
}
