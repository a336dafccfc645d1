//! Routing precedence and sync planning across crates

use chrono::{TimeZone, Utc};
use codex_sync::{
    AutoSyncPattern, CancelHandle, FileEntry, FrontMatter, Operation, OrgSyncRunner,
    RoutingRules, SyncDirection, SyncEndpoints, SyncJob, SyncOptions, parse_document, plan,
    should_sync,
};
use pretty_assertions::assert_eq;

fn endpoints(target: &str) -> SyncEndpoints {
    SyncEndpoints {
        source_id: "hub".to_string(),
        target_id: target.to_string(),
        direction: SyncDirection::Push,
    }
}

fn permissive_rules() -> RoutingRules {
    RoutingRules {
        auto_sync_patterns: vec![AutoSyncPattern {
            file_pattern: "*".to_string(),
            include_targets: vec!["*".to_string()],
            exclude_targets: vec![],
        }],
        ..RoutingRules::default()
    }
}

#[test]
fn new_source_file_becomes_a_create() {
    let source = vec![FileEntry::new("docs/new.md", "h1")];
    let plan = plan(
        &source,
        &[],
        &endpoints("api"),
        &SyncOptions::default(),
        &permissive_rules(),
    );

    assert_eq!(plan.files.len(), 1);
    assert_eq!(plan.files[0].path, "docs/new.md");
    assert_eq!(plan.files[0].operation, Operation::Create);
}

#[test]
fn newer_target_surfaces_as_conflict() {
    let source = vec![FileEntry::new("f.md", "a").with_mtime(Utc.timestamp_opt(100, 0).unwrap())];
    let target = vec![FileEntry::new("f.md", "b").with_mtime(Utc.timestamp_opt(200, 0).unwrap())];
    let plan = plan(
        &source,
        &target,
        &endpoints("api"),
        &SyncOptions::default(),
        &permissive_rules(),
    );

    assert!(plan.files.is_empty());
    assert_eq!(plan.conflicts.len(), 1);
    assert_eq!(plan.conflicts[0].path, "f.md");
    assert!(plan.ensure_no_conflicts().is_err());
}

#[test]
fn system_owned_files_never_sync_to_their_own_system() {
    // No auto-sync patterns; self-sync prevention decides.
    let rules = RoutingRules {
        auto_sync_patterns: vec![],
        prevent_self_sync: true,
        ..RoutingRules::default()
    };
    assert!(!should_sync(
        "systems/api/README.md",
        None,
        "hub",
        "api",
        &rules
    ));
}

#[test]
fn auto_sync_pattern_overrides_front_matter_exclude() {
    let rules = RoutingRules {
        auto_sync_patterns: vec![AutoSyncPattern {
            file_pattern: "docs/*".to_string(),
            include_targets: vec!["*".to_string()],
            exclude_targets: vec![],
        }],
        allow_frontmatter_overrides: true,
        ..RoutingRules::default()
    };

    let matter = FrontMatter {
        exclude: Some(vec!["api".to_string()]),
        ..FrontMatter::default()
    };
    assert!(should_sync("docs/a.md", Some(&matter), "hub", "api", &rules));
}

#[test]
fn front_matter_flows_from_document_to_decision() {
    let text = "---\ninclude:\n  - api\nexclude:\n  - web\n---\n# Doc\n";
    let parsed = parse_document(text).unwrap();
    let matter = parsed.front_matter.unwrap();

    let rules = RoutingRules {
        auto_sync_patterns: vec![],
        prevent_self_sync: true,
        prevent_target_sync: true,
        allow_frontmatter_overrides: true,
    };

    assert!(should_sync("docs/a.md", Some(&matter), "hub", "api", &rules));
    assert!(!should_sync("docs/a.md", Some(&matter), "hub", "web", &rules));
    assert!(!should_sync("docs/a.md", Some(&matter), "hub", "db", &rules));
}

#[test]
fn replanning_after_apply_converges_to_skips() {
    let source = vec![
        FileEntry::new("docs/a.md", "h1").with_size(3),
        FileEntry::new("docs/b.md", "h2").with_size(5),
    ];

    let first = plan(
        &source,
        &[],
        &endpoints("api"),
        &SyncOptions::default(),
        &permissive_rules(),
    );
    assert_eq!(first.total_files, 2);
    assert_eq!(first.total_bytes, 8);

    // Simulate the applier executing both creates.
    let target: Vec<FileEntry> = source.clone();
    let second = plan(
        &source,
        &target,
        &endpoints("api"),
        &SyncOptions::default(),
        &permissive_rules(),
    );
    assert_eq!(second.total_files, 0);
    assert_eq!(second.skipped.len(), 2);
    assert!(second.skipped.iter().all(|s| s.reason == "identical"));
}

#[tokio::test]
async fn org_runner_plans_repositories_under_bound() {
    let jobs: Vec<SyncJob> = ["api", "web", "db", "infra", "mobile"]
        .iter()
        .map(|repo| SyncJob {
            repository: repo.to_string(),
            source_files: vec![
                FileEntry::new("docs/shared.md", "h1"),
                FileEntry::new(format!("systems/{repo}/notes.md"), "h2"),
            ],
            target_files: Vec::new(),
            endpoints: SyncEndpoints {
                source_id: "hub".to_string(),
                target_id: repo.to_string(),
                direction: SyncDirection::Push,
            },
        })
        .collect();

    let rules = RoutingRules {
        auto_sync_patterns: vec![AutoSyncPattern {
            file_pattern: "docs/*".to_string(),
            include_targets: vec!["*".to_string()],
            exclude_targets: vec![],
        }],
        ..RoutingRules::default()
    };

    let runner = OrgSyncRunner::new(2, SyncOptions::default(), rules);
    let outcomes = runner.run(jobs, &CancelHandle::new()).await;

    assert_eq!(outcomes.len(), 5);
    for outcome in outcomes {
        let plan = outcome.plan.expect("job completed");
        // The shared doc syncs; the system's own notes are skipped by the
        // self-sync rule.
        assert_eq!(plan.total_files, 1);
        assert_eq!(plan.files[0].path, "docs/shared.md");
        assert_eq!(plan.skipped.len(), 1);
    }
}

#[tokio::test]
async fn cancelled_run_reports_unscheduled_jobs() {
    let cancel = CancelHandle::new();
    cancel.cancel();

    let jobs = vec![SyncJob {
        repository: "api".to_string(),
        source_files: vec![FileEntry::new("docs/a.md", "h")],
        target_files: Vec::new(),
        endpoints: endpoints("api"),
    }];

    let runner = OrgSyncRunner::new(2, SyncOptions::default(), permissive_rules());
    let outcomes = runner.run(jobs, &cancel).await;
    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].plan.is_none());
}

#[test]
fn plan_summary_reads_like_a_report() {
    let source = vec![FileEntry::new("docs/new.md", "h1").with_size(7)];
    let plan = plan(
        &source,
        &[],
        &endpoints("api"),
        &SyncOptions::default(),
        &permissive_rules(),
    );

    let summary = plan.summary();
    assert!(summary.starts_with("Sync plan (push): 1 operation(s), 7 byte(s)"));
    assert!(summary.contains("create  docs/new.md"));
}
