//! Per-type TTL defaults
//!
//! When a fetch carries no TTL override, the policy picks one from the
//! document's extension. Documentation changes often; lockfiles and build
//! metadata almost never do.

use codex_refs::extension;

/// Default TTL when no rule matches (1 hour)
pub const DEFAULT_TTL_SECS: u64 = 3600;

/// TTL policy consulted when no per-request override is supplied.
#[derive(Debug, Clone)]
pub struct TtlPolicy {
    default_ttl: u64,
}

impl TtlPolicy {
    pub fn new(default_ttl: u64) -> Self {
        Self { default_ttl }
    }

    /// TTL in seconds for a document path.
    pub fn ttl_for(&self, path: Option<&str>) -> u64 {
        let Some(path) = path else {
            return self.default_ttl;
        };

        match extension(path).as_deref() {
            // Documentation: refreshed frequently
            Some("md" | "markdown" | "txt" | "html") => self.default_ttl.min(3600),
            // Structured data and schemas: change on release cadence
            Some("json" | "yaml" | "yml" | "toml" | "xml") => 6 * 3600,
            // Lockfiles and archives: effectively immutable
            Some("lock" | "zip" | "gz" | "tar") => 24 * 3600,
            _ => self.default_ttl,
        }
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_TTL_SECS)
    }
}
