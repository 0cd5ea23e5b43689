//! [`CheckService`] backed by the `gh` CLI.
//!
//! Reruns are issued per suite. A suite whose runs all belong to one GitHub
//! Actions workflow run goes through `gh run rerun` (which honours
//! `--failed`); any other suite is rerequested through the check-suites API,
//! which always reruns the whole suite.

use super::{executor, parser};
use crate::app::{CheckRun, CheckSuite};
use crate::traits::CheckService;
use async_trait::async_trait;
use color_eyre::eyre::{eyre, Result};
use std::collections::{BTreeMap, HashSet};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RerunTarget {
    WorkflowRun(u64),
    CheckSuite(u64),
}

/// One target per suite, in ascending suite-id order. Runs without a suite
/// are skipped.
pub fn rerun_targets(runs: &[CheckRun]) -> Vec<RerunTarget> {
    let mut by_suite: BTreeMap<u64, Vec<&CheckRun>> = BTreeMap::new();
    for run in runs {
        match run.check_suite_id {
            Some(suite_id) => by_suite.entry(suite_id).or_default().push(run),
            None => tracing::warn!(run_id = run.id, "skipping check run without a suite"),
        }
    }

    by_suite
        .into_iter()
        .map(|(suite_id, runs)| {
            let first = runs.first().and_then(|r| r.workflow_run_id);
            match first {
                Some(run_id) if runs.iter().all(|r| r.workflow_run_id == Some(run_id)) => {
                    RerunTarget::WorkflowRun(run_id)
                }
                _ => RerunTarget::CheckSuite(suite_id),
            }
        })
        .collect()
}

pub struct GhCheckService {
    refreshed: watch::Sender<Vec<CheckRun>>,
}

impl Default for GhCheckService {
    fn default() -> Self {
        Self::new()
    }
}

impl GhCheckService {
    pub fn new() -> Self {
        let (refreshed, _) = watch::channel(Vec::new());
        Self { refreshed }
    }

    /// Check runs as last seen by [`CheckService::refresh_status`].
    pub fn subscribe(&self) -> watch::Receiver<Vec<CheckRun>> {
        self.refreshed.subscribe()
    }

    pub async fn fetch_check_runs(&self, repo: &str, git_ref: &str) -> Result<Vec<CheckRun>> {
        let json = executor::fetch_check_runs(repo, git_ref).await?;
        parser::parse_check_runs(&json)
    }
}

#[async_trait]
impl CheckService for GhCheckService {
    async fn fetch_check_suite(&self, repo: &str, suite_id: u64) -> Result<Option<CheckSuite>> {
        match executor::fetch_check_suite(repo, suite_id).await? {
            Some(json) => parser::parse_check_suite(&json).map(Some),
            None => Ok(None),
        }
    }

    async fn submit_rerun(&self, repo: &str, runs: &[CheckRun], failed_only: bool) -> Result<()> {
        let targets = rerun_targets(runs);
        let mut failures = Vec::new();
        for target in &targets {
            let result = match *target {
                RerunTarget::WorkflowRun(run_id) => {
                    executor::rerun_workflow(repo, run_id, failed_only).await
                }
                RerunTarget::CheckSuite(suite_id) => {
                    executor::rerequest_check_suite(repo, suite_id).await
                }
            };
            match result {
                Ok(()) => tracing::info!(rerun = ?target, failed_only, "rerun requested"),
                Err(e) => {
                    tracing::warn!(rerun = ?target, error = %e, "rerun request failed");
                    failures.push(e);
                }
            }
        }

        match failures.into_iter().next() {
            None => Ok(()),
            Some(first) if targets.len() == 1 => Err(first),
            Some(first) => Err(eyre!(
                "Rerun failed for some checks ({} requested): {first}",
                targets.len()
            )),
        }
    }

    async fn refresh_status(&self, repo: &str, git_ref: &str, runs: &[CheckRun]) -> Result<()> {
        let latest = self.fetch_check_runs(repo, git_ref).await?;
        let suites: HashSet<u64> = runs.iter().filter_map(|r| r.check_suite_id).collect();
        let active = latest
            .iter()
            .filter(|r| r.check_suite_id.is_some_and(|id| suites.contains(&id)))
            .filter(|r| r.status.is_active())
            .count();
        tracing::info!(git_ref, active, total = latest.len(), "check status refreshed");
        self.refreshed.send_replace(latest);
        Ok(())
    }
}
