//! Routing rules and sync planning for Codex Manager
//!
//! Pure decision logic: which files flow between a project and the shared
//! knowledge repository, and what an applier would have to do about it.
//!
//! - **Routing chain**: a fixed, short-circuiting precedence order —
//!   auto-sync patterns, self-sync prevention, target-is-source
//!   prevention, then per-document front matter
//! - **Planner**: diffs two file inventories into
//!   create/update/delete/skip/conflict proposals
//! - **Runner**: plans many repositories under a worker-pool bound with
//!   cooperative cancellation
//!
//! Nothing here performs file operations; plans are proposals for an
//! external applier.

pub mod error;
pub mod evaluator;
pub mod frontmatter;
pub mod pattern;
pub mod planner;
pub mod rules;
pub mod runner;

pub use error::{Error, Result};
pub use evaluator::{RoutingDecision, evaluate, should_sync};
pub use frontmatter::{FrontMatter, ParsedDocument, parse_document};
pub use pattern::{compile_glob, evaluate_targets, glob_match};
pub use planner::{
    Conflict, FileEntry, Operation, PlannedFile, Skipped, SyncDirection, SyncEndpoints,
    SyncOptions, SyncPlan, plan,
};
pub use rules::{AutoSyncPattern, RoutingRules, is_canonical_repository, owning_system};
pub use runner::{CancelHandle, JobOutcome, OrgSyncRunner, SyncJob};
