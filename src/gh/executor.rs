use color_eyre::eyre::{eyre, Result};
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

const GH_TIMEOUT: Duration = Duration::from_secs(30);

async fn gh_output(args: &[&str]) -> Result<Output> {
    let start = std::time::Instant::now();
    let output = tokio::time::timeout(GH_TIMEOUT, Command::new("gh").args(args).output())
        .await
        .map_err(|_| eyre!("gh command timed out after {}s", GH_TIMEOUT.as_secs()))?
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                eyre!("gh CLI not found. Install it from https://cli.github.com/")
            } else {
                eyre!("Failed to run gh: {}", e)
            }
        })?;

    tracing::debug!(
        args = ?args,
        success = output.status.success(),
        elapsed_ms = start.elapsed().as_millis(),
        "gh command completed"
    );
    Ok(output)
}

pub async fn run_gh(args: &[&str]) -> Result<String> {
    let output = gh_output(args).await?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(eyre!("{}", classify_gh_error(&stderr)));
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Like [`run_gh`], but an HTTP 404 from `gh api` yields `Ok(None)`.
pub async fn run_gh_optional(args: &[&str]) -> Result<Option<String>> {
    let output = gh_output(args).await?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if is_not_found(&stderr) {
            return Ok(None);
        }
        return Err(eyre!("{}", classify_gh_error(&stderr)));
    }
    Ok(Some(String::from_utf8_lossy(&output.stdout).to_string()))
}

pub async fn check_gh_available() -> Result<()> {
    run_gh(&["auth", "status"]).await.map(|_| ())
}

pub async fn detect_repo() -> Result<String> {
    let output = run_gh(&[
        "repo",
        "view",
        "--json",
        "nameWithOwner",
        "-q",
        ".nameWithOwner",
    ])
    .await?;
    let repo = output.trim().to_string();
    if repo.is_empty() {
        return Err(eyre!("Could not detect repository. Use --repo flag."));
    }
    Ok(repo)
}

/// Commit sha of `HEAD` in the current directory.
pub async fn detect_head_ref() -> Result<String> {
    let output = tokio::time::timeout(
        GH_TIMEOUT,
        Command::new("git").args(["rev-parse", "HEAD"]).output(),
    )
    .await
    .map_err(|_| eyre!("git command timed out after {}s", GH_TIMEOUT.as_secs()))?
    .map_err(|e| eyre!("Failed to detect HEAD: {}", e))?;

    if !output.status.success() {
        return Err(eyre!(
            "Failed to detect HEAD: {}. Use --ref flag.",
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Every check run on `git_ref`, one JSON object per line.
pub async fn fetch_check_runs(repo: &str, git_ref: &str) -> Result<String> {
    let endpoint = format!("repos/{repo}/commits/{git_ref}/check-runs?per_page=100");
    run_gh(&["api", "--paginate", &endpoint, "--jq", ".check_runs[]"]).await
}

pub async fn fetch_check_suite(repo: &str, suite_id: u64) -> Result<Option<String>> {
    let endpoint = format!("repos/{repo}/check-suites/{suite_id}");
    run_gh_optional(&["api", &endpoint]).await
}

pub async fn rerun_workflow(repo: &str, run_id: u64, failed_only: bool) -> Result<()> {
    let run_id_str = run_id.to_string();
    let mut args = vec!["run", "rerun", "--repo", repo, &run_id_str];
    if failed_only {
        args.push("--failed");
    }
    run_gh(&args).await?;
    Ok(())
}

pub async fn rerequest_check_suite(repo: &str, suite_id: u64) -> Result<()> {
    let endpoint = format!("repos/{repo}/check-suites/{suite_id}/rerequest");
    run_gh(&["api", "-X", "POST", &endpoint]).await?;
    Ok(())
}

fn is_not_found(stderr: &str) -> bool {
    stderr.contains("HTTP 404")
}

pub fn classify_gh_error(stderr: &str) -> String {
    if stderr.contains("not logged") || stderr.contains("auth login") {
        "Not authenticated with gh. Run `gh auth login` first.".to_string()
    } else if stderr.contains("not a git repository") || stderr.contains("could not determine") {
        "Not in a GitHub repository. Use --repo flag or cd into a repo.".to_string()
    } else if is_not_found(stderr) {
        "Not found on GitHub (check the repository and ref).".to_string()
    } else if stderr.contains("HTTP 403") {
        "GitHub refused the request (HTTP 403). Check your token's permissions.".to_string()
    } else {
        let trimmed = stderr.trim();
        if trimmed.is_empty() {
            "gh command failed".to_string()
        } else {
            format!("gh command failed: {trimmed}")
        }
    }
}
