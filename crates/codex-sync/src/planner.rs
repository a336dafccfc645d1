//! Sync planning: diffing two file inventories into a proposal
//!
//! A plan is pure data — create/update/delete operations plus conflicts
//! and skips, each with a justification. Nothing here touches the
//! filesystem; an external applier consumes the plan.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::evaluator::evaluate;
use crate::frontmatter::FrontMatter;
use crate::pattern::glob_match;
use crate::rules::RoutingRules;

/// One file in an inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    /// Repository-relative path, forward-slash separated
    pub path: String,
    /// Fast content hash used for change detection
    pub content_hash: String,
    /// Last modification time
    pub mtime: DateTime<Utc>,
    /// Size in bytes
    pub size: u64,
    /// Sync-relevant front matter, when the document declares any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_matter: Option<FrontMatter>,
}

impl FileEntry {
    /// Convenience constructor for inventories built in code.
    pub fn new(path: impl Into<String>, content_hash: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content_hash: content_hash.into(),
            mtime: Utc::now(),
            size: 0,
            front_matter: None,
        }
    }

    pub fn with_mtime(mut self, mtime: DateTime<Utc>) -> Self {
        self.mtime = mtime;
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn with_front_matter(mut self, front_matter: FrontMatter) -> Self {
        self.front_matter = Some(front_matter);
        self
    }
}

/// Direction of a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncDirection {
    /// Project files flow out to the target
    Push,
    /// Target files flow back into the project
    Pull,
}

/// Operation proposed for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

/// A proposed file operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedFile {
    pub path: String,
    pub operation: Operation,
    pub size: u64,
}

/// A file whose target copy is newer than the source copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conflict {
    pub path: String,
    pub source_mtime: DateTime<Utc>,
    pub target_mtime: DateTime<Utc>,
}

/// A file left out of the plan, with the reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skipped {
    pub path: String,
    pub reason: String,
}

/// Options governing a single planning run.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Overwrite targets even when their copy is newer
    pub force: bool,
    /// Propose deletions for target files absent from the source
    pub delete: bool,
    /// Cap on proposed file operations; the remainder is demoted to skips
    pub max_files: Option<usize>,
    /// Path globs excluded before the routing chain runs
    pub exclude: Vec<String>,
}

/// The proposal produced by [`plan`]. Never persisted, never executed
/// here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncPlan {
    pub direction: SyncDirection,
    pub files: Vec<PlannedFile>,
    pub conflicts: Vec<Conflict>,
    pub skipped: Vec<Skipped>,
    pub total_files: usize,
    pub total_bytes: u64,
}

impl SyncPlan {
    /// Fail when the plan carries conflicts; conflicts are never
    /// auto-resolved.
    pub fn ensure_no_conflicts(&self) -> Result<()> {
        match self.conflicts.first() {
            None => Ok(()),
            Some(first) => Err(Error::Conflict {
                count: self.conflicts.len(),
                first: first.path.clone(),
            }),
        }
    }

    /// Human-readable rendering for logs and review.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let direction = match self.direction {
            SyncDirection::Push => "push",
            SyncDirection::Pull => "pull",
        };
        out.push_str(&format!(
            "Sync plan ({direction}): {} operation(s), {} byte(s)\n",
            self.total_files, self.total_bytes
        ));
        for file in &self.files {
            let op = match file.operation {
                Operation::Create => "create",
                Operation::Update => "update",
                Operation::Delete => "delete",
            };
            out.push_str(&format!("  {op:7} {}\n", file.path));
        }
        for conflict in &self.conflicts {
            out.push_str(&format!(
                "  conflict {} (target modified {}, source {})\n",
                conflict.path,
                conflict.target_mtime.format("%Y-%m-%d %H:%M:%S"),
                conflict.source_mtime.format("%Y-%m-%d %H:%M:%S"),
            ));
        }
        for skip in &self.skipped {
            out.push_str(&format!("  skip    {} ({})\n", skip.path, skip.reason));
        }
        out
    }
}

/// Identities of the two sides of a sync.
#[derive(Debug, Clone)]
pub struct SyncEndpoints {
    /// Identifier of the repository files come from
    pub source_id: String,
    /// Identifier of the repository files go to
    pub target_id: String,
    pub direction: SyncDirection,
}

/// Diff two inventories into a plan.
///
/// Source files are processed in enumeration order, which keeps the
/// `max_files` truncation stable across runs. Planning is pure: equal
/// inputs always produce an equal plan.
pub fn plan(
    source_files: &[FileEntry],
    target_files: &[FileEntry],
    endpoints: &SyncEndpoints,
    options: &SyncOptions,
    rules: &RoutingRules,
) -> SyncPlan {
    let target_by_path: HashMap<&str, &FileEntry> = target_files
        .iter()
        .map(|entry| (entry.path.as_str(), entry))
        .collect();

    let mut files = Vec::new();
    let mut conflicts = Vec::new();
    let mut skipped = Vec::new();

    for source in source_files {
        if let Some(pattern) = options
            .exclude
            .iter()
            .find(|pattern| glob_match(pattern, &source.path))
        {
            skipped.push(Skipped {
                path: source.path.clone(),
                reason: format!("excluded by pattern '{pattern}'"),
            });
            continue;
        }

        let decision = evaluate(
            &source.path,
            source.front_matter.as_ref(),
            &endpoints.source_id,
            &endpoints.target_id,
            rules,
        );
        if !decision.allowed {
            skipped.push(Skipped {
                path: source.path.clone(),
                reason: decision.reason,
            });
            continue;
        }

        match target_by_path.get(source.path.as_str()) {
            None => files.push(PlannedFile {
                path: source.path.clone(),
                operation: Operation::Create,
                size: source.size,
            }),
            Some(target) if target.content_hash == source.content_hash => {
                skipped.push(Skipped {
                    path: source.path.clone(),
                    reason: "identical".to_string(),
                });
            }
            Some(target) => {
                if !options.force && target.mtime > source.mtime {
                    conflicts.push(Conflict {
                        path: source.path.clone(),
                        source_mtime: source.mtime,
                        target_mtime: target.mtime,
                    });
                } else {
                    files.push(PlannedFile {
                        path: source.path.clone(),
                        operation: Operation::Update,
                        size: source.size,
                    });
                }
            }
        }
    }

    if options.delete {
        let source_paths: HashMap<&str, ()> = source_files
            .iter()
            .map(|entry| (entry.path.as_str(), ()))
            .collect();
        for target in target_files {
            if source_paths.contains_key(target.path.as_str()) {
                continue;
            }
            let decision = evaluate(
                &target.path,
                target.front_matter.as_ref(),
                &endpoints.source_id,
                &endpoints.target_id,
                rules,
            );
            if decision.allowed {
                files.push(PlannedFile {
                    path: target.path.clone(),
                    operation: Operation::Delete,
                    size: 0,
                });
            } else {
                skipped.push(Skipped {
                    path: target.path.clone(),
                    reason: decision.reason,
                });
            }
        }
    }

    // Truncation demotes the tail to skips; conflicts and existing skips
    // are never truncated.
    if let Some(limit) = options.max_files
        && files.len() > limit
    {
        for demoted in files.drain(limit..).collect::<Vec<_>>() {
            skipped.push(Skipped {
                path: demoted.path,
                reason: format!("file limit exceeded ({limit})"),
            });
        }
    }

    let total_files = files.len();
    let total_bytes = files.iter().map(|f| f.size).sum();

    tracing::debug!(
        direction = ?endpoints.direction,
        operations = total_files,
        conflicts = conflicts.len(),
        skipped = skipped.len(),
        "sync plan built"
    );

    SyncPlan {
        direction: endpoints.direction,
        files,
        conflicts,
        skipped,
        total_files,
        total_bytes,
    }
}
