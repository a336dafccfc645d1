//! Reference parsing and resolution for Codex Manager
//!
//! This crate is the leaf of the workspace: it turns `codex://` URIs into
//! validated [`Reference`] values and resolves them against a cache root and
//! an injected project identity:
//!
//! - **Parsing**: strict URI grammar plus the legacy `$ref:` spelling
//! - **Path safety**: `validate_path` (authoritative) and `sanitize_path`
//!   (best-effort cleanup)
//! - **Resolution**: deterministic cache paths and local-path detection for
//!   the ambient project
//! - **Context detection**: an explicit collaborator that derives the
//!   ambient org/project from a git checkout's origin remote
//!
//! # Example
//!
//! ```
//! use codex_refs::Resolver;
//!
//! let resolver = Resolver::new("/tmp/codex-cache");
//! let resolved = resolver
//!     .resolve("codex://acme/handbook/docs/onboarding.md", None)
//!     .expect("valid URI");
//! assert!(resolved.cache_path.ends_with("acme/handbook/docs/onboarding.md"));
//! ```

pub mod context;
pub mod error;
pub mod path;
pub mod reference;

pub use context::{ProjectContext, detect_project_context, parse_remote_url};
pub use error::{Error, Result};
pub use path::{extension, is_safe_path, sanitize_path, validate_path};
pub use reference::{
    LEGACY_REF_PREFIX, Reference, ResolvedReference, Resolver, URI_PREFIX, build_uri,
};
