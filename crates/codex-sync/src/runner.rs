//! Organization-wide sync runs
//!
//! Plans many repositories concurrently under a worker-pool bound.
//! Completion order across repositories is not guaranteed; each
//! repository's own files are processed sequentially inside its plan, which
//! keeps conflict detection correct. Cancelling a run stops scheduling new
//! repository jobs while in-flight ones finish cleanly.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::planner::{FileEntry, SyncEndpoints, SyncOptions, SyncPlan, plan};
use crate::rules::RoutingRules;

/// One repository's worth of planning input.
#[derive(Debug, Clone)]
pub struct SyncJob {
    /// Target repository identifier
    pub repository: String,
    pub source_files: Vec<FileEntry>,
    pub target_files: Vec<FileEntry>,
    pub endpoints: SyncEndpoints,
}

/// Outcome of one repository job within a run.
#[derive(Debug)]
pub struct JobOutcome {
    pub repository: String,
    /// The plan, or `None` when the job was cancelled before scheduling
    pub plan: Option<SyncPlan>,
}

/// Cooperative cancellation handle for a run.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation: no new repository jobs are scheduled.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Bounded runner for organization-wide sync planning.
pub struct OrgSyncRunner {
    concurrency: usize,
    options: SyncOptions,
    rules: RoutingRules,
}

impl OrgSyncRunner {
    /// Create a runner with the given worker-pool bound (minimum 1).
    pub fn new(concurrency: usize, options: SyncOptions, rules: RoutingRules) -> Self {
        Self {
            concurrency: concurrency.max(1),
            options,
            rules,
        }
    }

    /// Plan every job, at most `concurrency` repositories in flight.
    ///
    /// Outcomes are returned in completion order. Jobs not yet scheduled
    /// when `cancel` fires are reported with `plan: None`.
    pub async fn run(&self, jobs: Vec<SyncJob>, cancel: &CancelHandle) -> Vec<JobOutcome> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        let mut outcomes = Vec::with_capacity(jobs.len());

        for job in jobs {
            // Acquire before scheduling so the cancellation check below
            // sees the run's true progress, not a queue of parked tasks.
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .expect("semaphore never closed");

            if cancel.is_cancelled() {
                tracing::info!(repository = %job.repository, "run cancelled, job not scheduled");
                outcomes.push(JobOutcome {
                    repository: job.repository,
                    plan: None,
                });
                continue;
            }

            let options = self.options.clone();
            let rules = self.rules.clone();
            tasks.spawn(async move {
                let _permit = permit;
                let plan = plan(
                    &job.source_files,
                    &job.target_files,
                    &job.endpoints,
                    &options,
                    &rules,
                );
                JobOutcome {
                    repository: job.repository,
                    plan: Some(plan),
                }
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => tracing::warn!(error = %e, "sync job panicked"),
            }
        }

        outcomes
    }
}
