//! Configuration and orchestration layer for Codex Manager
//!
//! `codex-core` sits above the layer-0 crates and below any CLI/API layer:
//!
//! ```text
//!                  CLI / API (external)
//!                          |
//!                      codex-core
//!                          |
//!      +---------+--------+---------+
//!      |         |        |         |
//! codex-refs codex-storage codex-cache codex-sync
//! ```
//!
//! It defines the configuration document the engine consumes and the
//! [`Codex`] facade that wires resolver, provider stack, and cache layer
//! together.
//!
//! # Example
//!
//! ```ignore
//! use codex_core::{Codex, CodexConfig};
//!
//! # async fn example() -> codex_core::Result<()> {
//! let codex = Codex::new(CodexConfig::default(), None)?;
//! let doc = codex.fetch("codex://acme/handbook/docs/onboarding.md").await?;
//! println!("{}", doc.text());
//! # Ok(())
//! # }
//! ```

pub mod codex;
pub mod config;
pub mod error;

pub use codex::Codex;
pub use config::{
    CodexConfig, DEFAULT_MAX_CONCURRENCY, DEFAULT_TTL_SECONDS, ProviderConfig, SyncConfig,
};
pub use error::{Error, Result};
