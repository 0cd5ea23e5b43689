use crate::app::{CheckRun, CheckSuite};
use async_trait::async_trait;
use color_eyre::eyre::Result;

/// Remote check service the resolver drives. Implementations own transport,
/// timeouts, and any retry policy.
#[async_trait]
pub trait CheckService: Send + Sync {
    /// `Ok(None)` when the suite does not exist (or is no longer visible).
    async fn fetch_check_suite(&self, repo: &str, suite_id: u64) -> Result<Option<CheckSuite>>;
    async fn submit_rerun(&self, repo: &str, runs: &[CheckRun], failed_only: bool) -> Result<()>;
    /// Called only after `submit_rerun` resolves.
    async fn refresh_status(&self, repo: &str, git_ref: &str, runs: &[CheckRun]) -> Result<()>;
}

/// Fire-and-forget usage counters. Must not block.
pub trait Telemetry: Send + Sync {
    fn record_rerun_event(&self);
}
