use clap::Parser;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_NUMBER"));

#[derive(Parser, Debug)]
#[command(name = "ghrr", version = VERSION, about = "Rerun the GitHub checks of a commit")]
pub struct Cli {
    /// Repository in owner/repo format (auto-detected from cwd)
    #[arg(short, long)]
    pub repo: Option<String>,

    /// Commit sha, branch, or tag whose checks to rerun (defaults to HEAD)
    #[arg(short = 'R', long = "ref")]
    pub git_ref: Option<String>,

    /// Only rerun checks that failed
    #[arg(short, long)]
    pub failed_only: bool,

    /// Rerun without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Enable verbose logging to $XDG_STATE_HOME/ghrr/debug.log
    #[arg(long)]
    pub verbose: bool,
}

/// Validates that `repo` is exactly `owner/name`.
pub fn validate_repo_format(repo: &str) -> Result<(), String> {
    let parts: Vec<&str> = repo.split('/').collect();
    if parts.len() != 2 || parts.iter().any(|p| p.is_empty()) || repo.contains(char::is_whitespace)
    {
        return Err(format!(
            "Invalid repository '{repo}'. Expected 'owner/repo' (e.g. 'cli/cli')."
        ));
    }
    Ok(())
}
