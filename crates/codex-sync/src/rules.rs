//! Routing rule configuration
//!
//! Consumed, not owned: collaborators load these from the project
//! configuration and hand them to the evaluator.

use serde::{Deserialize, Serialize};

/// One auto-sync rule: a file-path glob gating an include/exclude decision
/// over the target identifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutoSyncPattern {
    /// Glob over the file path that activates this rule
    pub file_pattern: String,
    /// Target globs the file syncs to (empty means none; `*` means all)
    #[serde(default)]
    pub include_targets: Vec<String>,
    /// Target globs that always win over the includes
    #[serde(default)]
    pub exclude_targets: Vec<String>,
}

/// The rule set evaluated by the routing chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingRules {
    /// Auto-sync patterns, consulted first and in order
    #[serde(default)]
    pub auto_sync_patterns: Vec<AutoSyncPattern>,
    /// A system's own files never sync back to itself
    #[serde(default = "default_true")]
    pub prevent_self_sync: bool,
    /// Never sync back into the source or the canonical shared repository
    #[serde(default = "default_true")]
    pub prevent_target_sync: bool,
    /// Whether per-document front-matter rules may decide
    #[serde(default)]
    pub allow_frontmatter_overrides: bool,
}

impl Default for RoutingRules {
    fn default() -> Self {
        Self {
            auto_sync_patterns: Vec::new(),
            prevent_self_sync: true,
            prevent_target_sync: true,
            allow_frontmatter_overrides: false,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Whether a repository name follows the canonical shared-repository
/// convention.
///
/// Naming-convention heuristic carried over from the source system; a
/// structural identifier would be sturdier, but callers rely on the
/// convention today.
pub fn is_canonical_repository(name: &str) -> bool {
    name == "codex" || name.ends_with("-codex")
}

/// Extract the owning system name from a `.../systems/{name}/...` path.
pub fn owning_system(file_path: &str) -> Option<&str> {
    let mut segments = file_path.split('/').peekable();
    while let Some(segment) = segments.next() {
        if segment == "systems" {
            return segments.peek().copied().filter(|name| !name.is_empty());
        }
    }
    None
}
