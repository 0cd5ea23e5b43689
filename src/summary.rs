use crate::app::{describe_outcome, CheckRun};
use crate::resolver::EligibilitySet;

pub fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

fn run_line(marker: char, run: &CheckRun) -> String {
    format!("  {marker} {} ({})", run.name, describe_outcome(run))
}

/// Plain-text description of a classification, one line per entry.
pub fn summary_lines(set: &EligibilitySet, failed_only: bool) -> Vec<String> {
    if set.loading {
        return vec!["Checking which checks can be rerun...".to_string()];
    }

    let kind = if failed_only { "failed check" } else { "check" };
    let mut lines = Vec::new();

    if set.rerunnable.is_empty() {
        lines.push(format!("There are no {kind}s that can be rerun."));
    } else {
        lines.push(format!(
            "{} will be rerun:",
            plural(set.rerunnable.len(), kind)
        ));
        lines.extend(set.rerunnable.iter().map(|r| run_line('+', r)));
    }

    if !set.non_rerunnable.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "{} cannot be rerun. A check cannot be rerun if it is more than 30 days old, \
             has not completed, or is not configured to be rerequested:",
            plural(set.non_rerunnable.len(), "check")
        ));
        lines.extend(set.non_rerunnable.iter().map(|r| run_line('-', r)));
    }

    if failed_only && !set.rerunnable.is_empty() {
        lines.push(String::new());
        lines.push("Only failed checks are included; successful checks are left as they are.".to_string());
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{CheckStatus, Conclusion};
    use pretty_assertions::assert_eq;

    fn run(name: &str, conclusion: Conclusion) -> CheckRun {
        CheckRun {
            id: 1,
            name: name.to_string(),
            check_suite_id: Some(1),
            status: CheckStatus::Completed,
            conclusion: Some(conclusion),
            workflow_run_id: None,
        }
    }

    #[test]
    fn loading_shows_single_line() {
        let lines = summary_lines(&EligibilitySet::pending(), false);
        assert_eq!(lines, vec!["Checking which checks can be rerun...".to_string()]);
    }

    #[test]
    fn nothing_rerunnable() {
        let set = EligibilitySet::default();
        let lines = summary_lines(&set, false);
        assert_eq!(lines, vec!["There are no checks that can be rerun.".to_string()]);
    }

    #[test]
    fn counts_and_run_lines() {
        let set = EligibilitySet {
            rerunnable: vec![run("build", Conclusion::Failure), run("test", Conclusion::Success)],
            non_rerunnable: vec![run("deploy", Conclusion::Cancelled)],
            loading: false,
        };
        let lines = summary_lines(&set, false);
        assert_eq!(lines[0], "2 checks will be rerun:");
        assert_eq!(lines[1], "  + build (failure)");
        assert_eq!(lines[2], "  + test (success)");
        assert!(lines[4].starts_with("1 check cannot be rerun."));
        assert_eq!(lines[5], "  - deploy (cancelled)");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn failed_only_wording() {
        let set = EligibilitySet {
            rerunnable: vec![run("build", Conclusion::Failure)],
            non_rerunnable: vec![],
            loading: false,
        };
        let lines = summary_lines(&set, true);
        assert_eq!(lines[0], "1 failed check will be rerun:");
        assert!(lines.last().unwrap().starts_with("Only failed checks"));
    }
}
