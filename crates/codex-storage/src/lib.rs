//! Storage providers and dispatch for Codex Manager
//!
//! Three providers cover the places a document can live:
//!
//! - [`LocalStorage`] — the ambient project checkout
//! - [`GitHubStorage`] — hosted repository raw content, branch-selectable
//! - [`HttpStorage`] — generic HTTP mirror, the lowest-priority fallback
//!
//! Each is a standalone value implementing the [`StorageProvider`]
//! capability contract; the [`StorageManager`] dispatches a fetch to the
//! first provider (in priority order) that can handle the reference. A
//! failure from the chosen provider propagates — there is no
//! retry-on-error fallback across providers.

pub mod content_type;
pub mod error;
pub mod github;
pub mod http;
pub mod local;
pub mod manager;
pub mod provider;

pub use content_type::{DEFAULT_CONTENT_TYPE, content_type_for_path};
pub use error::{Error, Result};
pub use github::GitHubStorage;
pub use http::HttpStorage;
pub use local::LocalStorage;
pub use manager::StorageManager;
pub use provider::{DEFAULT_MAX_BYTES, DEFAULT_TIMEOUT, FetchOptions, FetchResult, StorageProvider};
