//! Check run and check suite data model.

use chrono::{DateTime, Duration, Utc};

/// Suites older than this can no longer be rerequested on GitHub.
pub const SUITE_MAX_AGE_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Completed,
    InProgress,
    Queued,
    Requested,
    Waiting,
    Pending,
    #[serde(other)]
    Unknown,
}

impl CheckStatus {
    /// Queued or running on the remote side.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            Self::InProgress | Self::Queued | Self::Requested | Self::Waiting | Self::Pending
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::InProgress => "in progress",
            Self::Queued => "queued",
            Self::Requested => "requested",
            Self::Waiting => "waiting",
            Self::Pending => "pending",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conclusion {
    Success,
    Failure,
    Cancelled,
    Skipped,
    TimedOut,
    ActionRequired,
    StartupFailure,
    Stale,
    Neutral,
    #[serde(other)]
    Unknown,
}

/// One executed check, as reported for a commit. Read-only snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRun {
    pub id: u64,
    pub name: String,
    /// `None` for checks created outside any suite (e.g. legacy status integrations).
    pub check_suite_id: Option<u64>,
    pub status: CheckStatus,
    pub conclusion: Option<Conclusion>,
    /// Set when the run's URL points into a GitHub Actions workflow run.
    pub workflow_run_id: Option<u64>,
}

impl CheckRun {
    pub fn is_failure(&self) -> bool {
        self.conclusion == Some(Conclusion::Failure)
    }
}

/// Suite-level metadata that decides rerun eligibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckSuite {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub status: CheckStatus,
    pub rerequestable: bool,
}

impl CheckSuite {
    /// Rerequestable, created strictly within the last 30 days, and completed.
    pub fn is_rerunnable_at(&self, now: DateTime<Utc>) -> bool {
        let cutoff = now - Duration::days(SUITE_MAX_AGE_DAYS);
        self.rerequestable && self.created_at > cutoff && self.status == CheckStatus::Completed
    }
}

impl Conclusion {
    pub fn label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Cancelled => "cancelled",
            Self::Skipped => "skipped",
            Self::TimedOut => "timed out",
            Self::ActionRequired => "action required",
            Self::StartupFailure => "startup failure",
            Self::Stale => "stale",
            Self::Neutral => "neutral",
            Self::Unknown => "unknown",
        }
    }
}

/// Human-readable label for a run's current state.
pub fn describe_outcome(run: &CheckRun) -> &'static str {
    match (run.status, run.conclusion) {
        (CheckStatus::Completed, Some(c)) => c.label(),
        (status, _) => status.label(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suite(age: Duration, status: CheckStatus, rerequestable: bool) -> (CheckSuite, DateTime<Utc>) {
        let now = Utc::now();
        (
            CheckSuite {
                id: 1,
                created_at: now - age,
                status,
                rerequestable,
            },
            now,
        )
    }

    #[test]
    fn fresh_completed_rerequestable_suite_is_rerunnable() {
        let (s, now) = suite(Duration::days(1), CheckStatus::Completed, true);
        assert!(s.is_rerunnable_at(now));
    }

    #[test]
    fn suite_exactly_thirty_days_old_is_not_rerunnable() {
        let (s, now) = suite(Duration::days(30), CheckStatus::Completed, true);
        assert!(!s.is_rerunnable_at(now));
    }

    #[test]
    fn suite_just_under_thirty_days_is_rerunnable() {
        let age = Duration::days(29) + Duration::hours(23);
        let (s, now) = suite(age, CheckStatus::Completed, true);
        assert!(s.is_rerunnable_at(now));
    }

    #[test]
    fn suite_older_than_thirty_days_is_not_rerunnable() {
        let (s, now) = suite(Duration::days(45), CheckStatus::Completed, true);
        assert!(!s.is_rerunnable_at(now));
    }

    #[test]
    fn non_rerequestable_suite_is_never_rerunnable() {
        let (s, now) = suite(Duration::minutes(5), CheckStatus::Completed, false);
        assert!(!s.is_rerunnable_at(now));
    }

    #[test]
    fn in_progress_suite_is_never_rerunnable() {
        let (s, now) = suite(Duration::minutes(5), CheckStatus::InProgress, true);
        assert!(!s.is_rerunnable_at(now));
    }

    #[test]
    fn queued_suite_is_not_rerunnable() {
        let (s, now) = suite(Duration::minutes(5), CheckStatus::Queued, true);
        assert!(!s.is_rerunnable_at(now));
    }

    #[test]
    fn active_statuses() {
        assert!(CheckStatus::Queued.is_active());
        assert!(CheckStatus::InProgress.is_active());
        assert!(!CheckStatus::Completed.is_active());
        assert!(!CheckStatus::Unknown.is_active());
    }

    #[test]
    fn is_failure_only_for_failure_conclusion() {
        let mut run = CheckRun {
            id: 1,
            name: "build".to_string(),
            check_suite_id: Some(1),
            status: CheckStatus::Completed,
            conclusion: Some(Conclusion::Failure),
            workflow_run_id: None,
        };
        assert!(run.is_failure());
        run.conclusion = Some(Conclusion::TimedOut);
        assert!(!run.is_failure());
        run.conclusion = None;
        assert!(!run.is_failure());
    }

    #[test]
    fn describe_outcome_labels() {
        let mut run = CheckRun {
            id: 1,
            name: "lint".to_string(),
            check_suite_id: None,
            status: CheckStatus::Completed,
            conclusion: Some(Conclusion::TimedOut),
            workflow_run_id: None,
        };
        assert_eq!(describe_outcome(&run), "timed out");
        run.status = CheckStatus::InProgress;
        run.conclusion = None;
        assert_eq!(describe_outcome(&run), "in progress");
    }
}
