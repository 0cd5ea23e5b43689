//! Splits a commit's check runs into rerunnable and non-rerunnable lists.
//!
//! Suite metadata is looked up once per distinct suite id, all lookups in
//! flight together on a [`JoinSet`]. A lookup that errors or finds nothing
//! only makes that suite ineligible; the pass always completes.

use crate::app::{CheckRun, CheckSuite};
use crate::traits::CheckService;
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Result of one classification pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EligibilitySet {
    pub rerunnable: Vec<CheckRun>,
    pub non_rerunnable: Vec<CheckRun>,
    /// `true` until the pass has settled.
    pub loading: bool,
}

impl EligibilitySet {
    pub fn pending() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }
}

/// Runs considered for rerun: only failures when `failed_only`, otherwise all.
pub fn working_subset(runs: &[CheckRun], failed_only: bool) -> Vec<CheckRun> {
    runs.iter()
        .filter(|r| !failed_only || r.is_failure())
        .cloned()
        .collect()
}

/// Distinct non-null suite ids, in ascending order.
pub fn distinct_suite_ids(runs: &[CheckRun]) -> BTreeSet<u64> {
    runs.iter().filter_map(|r| r.check_suite_id).collect()
}

/// Fetches every suite concurrently and returns the ones that were found.
pub async fn fetch_suites(
    service: Arc<dyn CheckService>,
    repo: &str,
    suite_ids: impl IntoIterator<Item = u64>,
) -> Vec<CheckSuite> {
    let mut join_set = JoinSet::new();
    for suite_id in suite_ids {
        let service = Arc::clone(&service);
        let repo = repo.to_string();
        join_set.spawn(async move {
            let result = service.fetch_check_suite(&repo, suite_id).await;
            (suite_id, result)
        });
    }

    let mut suites = Vec::new();
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((_, Ok(Some(suite)))) => suites.push(suite),
            Ok((suite_id, Ok(None))) => {
                tracing::debug!(suite_id, "check suite not found, treating as not rerunnable");
            }
            Ok((suite_id, Err(e))) => {
                tracing::warn!(suite_id, error = %e, "check suite fetch failed");
            }
            Err(join_err) => {
                tracing::warn!("check suite fetch task failed: {join_err}");
            }
        }
    }
    suites
}

pub fn eligible_suite_ids(suites: &[CheckSuite], now: DateTime<Utc>) -> HashSet<u64> {
    suites
        .iter()
        .filter(|s| s.is_rerunnable_at(now))
        .map(|s| s.id)
        .collect()
}

/// Working-subset runs whose suite is eligible.
pub fn rerunnable_runs(working: &[CheckRun], eligible: &HashSet<u64>) -> Vec<CheckRun> {
    working
        .iter()
        .filter(|r| r.check_suite_id.is_some_and(|id| eligible.contains(&id)))
        .cloned()
        .collect()
}

/// Derived from the full run list, not as the complement of
/// [`rerunnable_runs`]. In failed-only mode every failure is listed here as
/// well, whatever its suite.
pub fn non_rerunnable_runs(
    all: &[CheckRun],
    eligible: &HashSet<u64>,
    failed_only: bool,
) -> Vec<CheckRun> {
    all.iter()
        .filter(|r| match r.check_suite_id {
            None => true,
            Some(id) => !eligible.contains(&id) || (failed_only && r.is_failure()),
        })
        .cloned()
        .collect()
}

/// Pure half of classification, given the suites that were found.
pub fn classify_with_suites(
    runs: &[CheckRun],
    failed_only: bool,
    suites: &[CheckSuite],
    now: DateTime<Utc>,
) -> EligibilitySet {
    let working = working_subset(runs, failed_only);
    let eligible = eligible_suite_ids(suites, now);
    EligibilitySet {
        rerunnable: rerunnable_runs(&working, &eligible),
        non_rerunnable: non_rerunnable_runs(runs, &eligible, failed_only),
        loading: false,
    }
}

pub async fn classify(
    service: Arc<dyn CheckService>,
    repo: &str,
    runs: &[CheckRun],
    failed_only: bool,
) -> EligibilitySet {
    let working = working_subset(runs, failed_only);
    let suite_ids = distinct_suite_ids(&working);
    let start = std::time::Instant::now();
    let suites = fetch_suites(service, repo, suite_ids.iter().copied()).await;
    let set = classify_with_suites(runs, failed_only, &suites, Utc::now());
    tracing::debug!(
        requested = suite_ids.len(),
        found = suites.len(),
        rerunnable = set.rerunnable.len(),
        non_rerunnable = set.non_rerunnable.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "classification settled"
    );
    set
}
