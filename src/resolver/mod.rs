//! Rerun resolver: classifies a commit's check runs, then resubmits the
//! rerunnable ones on confirmation.
//!
//! Lifecycle is `Classifying → Ready → Submitting → Done`. Classification runs
//! on a spawned task from [`RerunResolver::start`]; [`RerunResolver::settle`]
//! joins it. [`RerunResolver::cancel`] is valid in every state. Cancelling
//! while classification is in flight detaches the task: its lookups finish
//! but the result is never applied.

pub mod classify;

pub use classify::EligibilitySet;

use crate::app::CheckRun;
use crate::traits::{CheckService, Telemetry};
use color_eyre::eyre::{eyre, Result};
use std::sync::Arc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// `owner/repo`
    pub repo: String,
    /// Commit sha or ref the check runs belong to.
    pub git_ref: String,
    pub failed_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    Classifying,
    Ready,
    Submitting,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub resubmitted: usize,
    /// `false` when the post-rerun status refresh failed.
    pub refreshed: bool,
}

pub type DismissFn = Box<dyn FnOnce() + Send>;

pub struct RerunResolver {
    config: ResolverConfig,
    service: Arc<dyn CheckService>,
    telemetry: Arc<dyn Telemetry>,
    check_runs: Vec<CheckRun>,
    state: ResolverState,
    eligibility: EligibilitySet,
    classification: Option<JoinHandle<EligibilitySet>>,
    on_dismiss: Option<DismissFn>,
}

impl RerunResolver {
    /// Must be called inside a tokio runtime.
    pub fn start(
        config: ResolverConfig,
        check_runs: Vec<CheckRun>,
        service: Arc<dyn CheckService>,
        telemetry: Arc<dyn Telemetry>,
        on_dismiss: DismissFn,
    ) -> Self {
        let task_service = Arc::clone(&service);
        let task_repo = config.repo.clone();
        let task_runs = check_runs.clone();
        let failed_only = config.failed_only;
        let classification = tokio::spawn(async move {
            classify::classify(task_service, &task_repo, &task_runs, failed_only).await
        });

        Self {
            config,
            service,
            telemetry,
            check_runs,
            state: ResolverState::Classifying,
            eligibility: EligibilitySet::pending(),
            classification: Some(classification),
            on_dismiss: Some(on_dismiss),
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn check_runs(&self) -> &[CheckRun] {
        &self.check_runs
    }

    pub fn state(&self) -> ResolverState {
        self.state
    }

    pub fn eligibility(&self) -> &EligibilitySet {
        &self.eligibility
    }

    pub fn is_loading(&self) -> bool {
        self.eligibility.loading
    }

    /// Confirm is enabled only once classified and with something to rerun.
    pub fn can_confirm(&self) -> bool {
        self.state == ResolverState::Ready && !self.eligibility.rerunnable.is_empty()
    }

    /// Waits for classification to finish and applies it. Cancel-safe: if this
    /// future is dropped, a later call resumes waiting on the same task.
    pub async fn settle(&mut self) -> Result<ResolverState> {
        if let Some(handle) = self.classification.as_mut() {
            let joined = handle.await;
            self.classification = None;
            let set = joined.map_err(|e| eyre!("Classification task failed: {e}"))?;
            self.apply_classification(set);
        }
        Ok(self.state)
    }

    /// Returns `false` (and changes nothing) if the resolver was already closed.
    fn apply_classification(&mut self, mut set: EligibilitySet) -> bool {
        if self.state != ResolverState::Classifying {
            tracing::debug!(state = ?self.state, "dropping classification for closed resolver");
            return false;
        }
        set.loading = false;
        self.eligibility = set;
        self.state = ResolverState::Ready;
        true
    }

    /// Resubmits the rerunnable runs, refreshes their status, records the
    /// event, and dismisses.
    pub async fn confirm(&mut self) -> Result<SubmitOutcome> {
        match self.state {
            ResolverState::Classifying => {
                return Err(eyre!("Cannot rerun yet: still checking which checks can be rerun"));
            }
            ResolverState::Submitting => return Err(eyre!("A rerun is already being submitted")),
            ResolverState::Done => return Err(eyre!("Rerun was already completed or cancelled")),
            ResolverState::Ready => {}
        }
        if self.eligibility.rerunnable.is_empty() {
            return Err(eyre!("Nothing to rerun: none of the checks can be rerun"));
        }

        self.state = ResolverState::Submitting;
        let runs = self.eligibility.rerunnable.clone();
        let ResolverConfig {
            repo,
            git_ref,
            failed_only,
        } = &self.config;

        tracing::info!(
            repo = %repo,
            git_ref = %git_ref,
            failed_only,
            count = runs.len(),
            "submitting rerun"
        );
        if let Err(e) = self.service.submit_rerun(repo, &runs, *failed_only).await {
            self.state = ResolverState::Ready;
            return Err(e);
        }

        let refreshed = match self.service.refresh_status(repo, git_ref, &runs).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "status refresh after rerun failed");
                false
            }
        };

        self.telemetry.record_rerun_event();
        self.finish();
        Ok(SubmitOutcome {
            resubmitted: runs.len(),
            refreshed,
        })
    }

    /// Dismisses immediately. A second call is a no-op.
    pub fn cancel(&mut self) {
        if self.state == ResolverState::Done {
            return;
        }
        tracing::debug!(state = ?self.state, "resolver cancelled");
        self.finish();
    }

    fn finish(&mut self) {
        self.state = ResolverState::Done;
        // Dropping the handle detaches the task; it is never joined again.
        self.classification = None;
        if let Some(dismiss) = self.on_dismiss.take() {
            dismiss();
        }
    }
}
