//! The routing precedence chain
//!
//! `should_sync` walks a fixed, short-circuiting chain: the first rule that
//! produces a definite answer wins and later rules are never consulted.
//!
//! 1. Auto-sync pattern match (include/exclude over the target)
//! 2. Self-sync prevention (`systems/{name}/` owned paths)
//! 3. Target-is-source / canonical-repository prevention
//! 4. Front-matter rules (inclusion must be explicit)

use crate::frontmatter::FrontMatter;
use crate::pattern::{evaluate_targets, glob_match};
use crate::rules::{RoutingRules, is_canonical_repository, owning_system};

/// A routing decision plus the justification that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingDecision {
    /// Whether the file syncs to the target
    pub allowed: bool,
    /// Which rule decided, in human-readable form
    pub reason: String,
}

impl RoutingDecision {
    fn allow(reason: impl Into<String>) -> Self {
        Self {
            allowed: true,
            reason: reason.into(),
        }
    }

    fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
        }
    }
}

/// Evaluate the routing chain for one file against one target.
pub fn evaluate(
    file_path: &str,
    front_matter: Option<&FrontMatter>,
    source_id: &str,
    target_id: &str,
    rules: &RoutingRules,
) -> RoutingDecision {
    // 1. Auto-sync patterns terminate the chain as soon as one matches the
    //    file path, whichever way the target evaluation goes.
    for pattern in &rules.auto_sync_patterns {
        if glob_match(&pattern.file_pattern, file_path) {
            let allowed = evaluate_targets(
                target_id,
                &pattern.include_targets,
                &pattern.exclude_targets,
            );
            let verdict = if allowed { "includes" } else { "excludes" };
            return RoutingDecision {
                allowed,
                reason: format!(
                    "auto-sync pattern '{}' {} target '{}'",
                    pattern.file_pattern, verdict, target_id
                ),
            };
        }
    }

    // 2. A system's own files never sync back to itself.
    if rules.prevent_self_sync
        && let Some(owner) = owning_system(file_path)
        && owner == target_id
    {
        return RoutingDecision::deny(format!(
            "file is owned by system '{owner}' and never syncs back to it"
        ));
    }

    // 3. Never sync back into the source or the canonical repository.
    if rules.prevent_target_sync {
        if target_id == source_id {
            return RoutingDecision::deny(format!("target '{target_id}' is the sync source"));
        }
        if is_canonical_repository(target_id) {
            return RoutingDecision::deny(format!(
                "target '{target_id}' is the canonical shared repository"
            ));
        }
    }

    // 4. Front-matter rules are the terminal step.
    if !rules.allow_frontmatter_overrides {
        return RoutingDecision::deny("project-level front-matter overrides are disabled");
    }

    let include = front_matter.map(FrontMatter::include_targets).unwrap_or(&[]);
    let exclude = front_matter.map(FrontMatter::exclude_targets).unwrap_or(&[]);

    if include.is_empty() {
        return RoutingDecision::deny("inclusion must be explicit and no include list is present");
    }

    if evaluate_targets(target_id, include, exclude) {
        RoutingDecision::allow(format!("front matter includes target '{target_id}'"))
    } else {
        RoutingDecision::deny(format!("front matter does not include target '{target_id}'"))
    }
}

/// Boolean convenience over [`evaluate`].
pub fn should_sync(
    file_path: &str,
    front_matter: Option<&FrontMatter>,
    source_id: &str,
    target_id: &str,
    rules: &RoutingRules,
) -> bool {
    evaluate(file_path, front_matter, source_id, target_id, rules).allowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::AutoSyncPattern;

    fn overrides_enabled() -> RoutingRules {
        RoutingRules {
            allow_frontmatter_overrides: true,
            ..RoutingRules::default()
        }
    }

    fn fm(include: &[&str], exclude: &[&str]) -> FrontMatter {
        FrontMatter {
            include: Some(include.iter().map(|s| s.to_string()).collect()),
            exclude: Some(exclude.iter().map(|s| s.to_string()).collect()),
            ..FrontMatter::default()
        }
    }

    #[test]
    fn auto_sync_pattern_decides_first() {
        let rules = RoutingRules {
            auto_sync_patterns: vec![AutoSyncPattern {
                file_pattern: "docs/*".to_string(),
                include_targets: vec!["*".to_string()],
                exclude_targets: vec![],
            }],
            ..overrides_enabled()
        };

        // Overrides a front-matter exclude: the chain stopped at step 1.
        let excluding = fm(&[], &["api"]);
        assert!(should_sync("docs/guide.md", Some(&excluding), "hub", "api", &rules));
    }

    #[test]
    fn auto_sync_exclude_wins_over_include() {
        let rules = RoutingRules {
            auto_sync_patterns: vec![AutoSyncPattern {
                file_pattern: "docs/*".to_string(),
                include_targets: vec!["*".to_string()],
                exclude_targets: vec!["internal-*".to_string()],
            }],
            ..RoutingRules::default()
        };

        assert!(should_sync("docs/a.md", None, "hub", "api", &rules));
        assert!(!should_sync("docs/a.md", None, "hub", "internal-tools", &rules));
    }

    #[test]
    fn self_sync_is_prevented() {
        let rules = RoutingRules::default();
        let decision = evaluate("systems/api/README.md", None, "hub", "api", &rules);
        assert!(!decision.allowed);
        assert!(decision.reason.contains("api"));

        // A different target is not the owner; the chain falls through to
        // later rules instead.
        let other = evaluate("systems/api/README.md", None, "hub", "web", &rules);
        assert!(other.reason.contains("front-matter overrides"));
    }

    #[test]
    fn self_sync_check_can_be_disabled() {
        let rules = RoutingRules {
            prevent_self_sync: false,
            allow_frontmatter_overrides: true,
            ..RoutingRules::default()
        };
        let include_all = fm(&["*"], &[]);
        assert!(should_sync(
            "systems/api/README.md",
            Some(&include_all),
            "hub",
            "api",
            &rules
        ));
    }

    #[test]
    fn target_matching_source_is_denied() {
        let rules = overrides_enabled();
        let include_all = fm(&["*"], &[]);
        assert!(!should_sync("docs/a.md", Some(&include_all), "hub", "hub", &rules));
    }

    #[test]
    fn canonical_repository_is_denied() {
        let rules = overrides_enabled();
        let include_all = fm(&["*"], &[]);
        assert!(!should_sync("docs/a.md", Some(&include_all), "hub", "codex", &rules));
        assert!(!should_sync(
            "docs/a.md",
            Some(&include_all),
            "hub",
            "acme-codex",
            &rules
        ));
    }

    #[test]
    fn disabled_overrides_deny_at_step_four() {
        let rules = RoutingRules::default();
        let include_all = fm(&["*"], &[]);
        assert!(!should_sync("docs/a.md", Some(&include_all), "hub", "api", &rules));
    }

    #[test]
    fn empty_include_list_means_do_not_sync() {
        let rules = overrides_enabled();
        assert!(!should_sync("docs/a.md", Some(&fm(&[], &[])), "hub", "api", &rules));
        assert!(!should_sync("docs/a.md", None, "hub", "api", &rules));
    }

    #[test]
    fn front_matter_include_and_exclude_evaluate_like_step_one() {
        let rules = overrides_enabled();
        let matter = fm(&["api", "web-*"], &["web-legacy"]);
        assert!(should_sync("docs/a.md", Some(&matter), "hub", "api", &rules));
        assert!(should_sync("docs/a.md", Some(&matter), "hub", "web-next", &rules));
        assert!(!should_sync("docs/a.md", Some(&matter), "hub", "web-legacy", &rules));
        assert!(!should_sync("docs/a.md", Some(&matter), "hub", "db", &rules));
    }

    #[test]
    fn decisions_carry_justifications() {
        let rules = RoutingRules::default();
        let decision = evaluate("systems/api/README.md", None, "hub", "api", &rules);
        assert!(!decision.reason.is_empty());
    }
}
