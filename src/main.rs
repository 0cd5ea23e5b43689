use ghrr::cli::{self, Cli};
use ghrr::gh::{self, GhCheckService};
use ghrr::input::{self, Action, InputContext};
use ghrr::resolver::{RerunResolver, ResolverConfig};
use ghrr::summary::{plural, summary_lines};
use ghrr::telemetry::TracingTelemetry;

use clap::Parser;
use color_eyre::eyre::{eyre, Result};
use crossterm::terminal;
use std::io::{self, Write};
use std::sync::Arc;

fn setup_verbose_logging() -> Result<()> {
    let state_dir = state_dir_or_fallback();
    std::fs::create_dir_all(&state_dir)
        .map_err(|e| eyre!("Failed to create log directory {state_dir:?}: {e}"))?;
    let log_path = state_dir.join("debug.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|e| eyre!("Failed to open log file {log_path:?}: {e}"))?;
    tracing_subscriber::fmt()
        .with_writer(file)
        .with_ansi(false)
        .init();
    tracing::info!(
        "ghrr v{} starting with verbose logging",
        env!("CARGO_PKG_VERSION")
    );
    Ok(())
}

fn state_dir_or_fallback() -> std::path::PathBuf {
    if let Some(state) = std::env::var_os("XDG_STATE_HOME") {
        std::path::PathBuf::from(state).join("ghrr")
    } else if let Some(home) = std::env::var_os("HOME") {
        std::path::PathBuf::from(home)
            .join(".local")
            .join("state")
            .join("ghrr")
    } else {
        std::path::PathBuf::from("/tmp/ghrr")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Cli::parse();

    if args.verbose {
        setup_verbose_logging()?;
    }

    // The confirmation prompt puts the terminal in raw mode
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        if let Err(e) = terminal::disable_raw_mode() {
            eprintln!("Failed to disable raw mode during panic: {e}");
        }
        original_hook(panic_info);
    }));

    if let Err(e) = run(args).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run(args: Cli) -> Result<()> {
    gh::executor::check_gh_available().await?;

    let repo = match args.repo {
        Some(r) => {
            cli::validate_repo_format(&r).map_err(|e| eyre!(e))?;
            r
        }
        None => gh::executor::detect_repo().await?,
    };
    let git_ref = match args.git_ref {
        Some(r) => r,
        None => gh::executor::detect_head_ref().await?,
    };

    let service = Arc::new(GhCheckService::new());
    let check_runs = service.fetch_check_runs(&repo, &git_ref).await?;
    if check_runs.is_empty() {
        println!("No checks found for {git_ref} in {repo}.");
        return Ok(());
    }

    let telemetry = Arc::new(TracingTelemetry::new());
    let config = ResolverConfig {
        repo,
        git_ref,
        failed_only: args.failed_only,
    };
    let mut resolver = RerunResolver::start(
        config,
        check_runs,
        service.clone(),
        telemetry.clone(),
        Box::new(|| tracing::debug!("rerun prompt dismissed")),
    );

    for line in summary_lines(resolver.eligibility(), args.failed_only) {
        println!("{line}");
    }

    let interrupted = tokio::select! {
        settled = resolver.settle() => {
            settled?;
            false
        }
        _ = tokio::signal::ctrl_c() => true,
    };
    if interrupted {
        resolver.cancel();
        println!("Cancelled.");
        return Ok(());
    }

    println!();
    for line in summary_lines(resolver.eligibility(), args.failed_only) {
        println!("{line}");
    }

    if !resolver.can_confirm() {
        resolver.cancel();
        return Ok(());
    }

    let decision = if args.yes {
        Action::Confirm
    } else {
        print!(
            "\nRerun {}? [y/n] ",
            plural(resolver.eligibility().rerunnable.len(), "check")
        );
        io::stdout().flush()?;
        let ctx = InputContext {
            can_confirm: resolver.can_confirm(),
        };
        let decision = tokio::task::spawn_blocking(move || input::read_decision(&ctx))
            .await
            .map_err(|e| eyre!("Input task failed: {e}"))??;
        println!();
        decision
    };

    match decision {
        Action::Confirm => {
            let refreshed = service.subscribe();
            let outcome = resolver.confirm().await?;
            println!("Requested a rerun of {}.", plural(outcome.resubmitted, "check"));
            if outcome.refreshed {
                let active = refreshed
                    .borrow()
                    .iter()
                    .filter(|r| r.status.is_active())
                    .count();
                println!("{} now queued or running.", plural(active, "check"));
            } else {
                println!("Could not refresh check status; it will update on GitHub shortly.");
            }
        }
        Action::Cancel | Action::None => {
            resolver.cancel();
            println!("Cancelled.");
        }
    }

    tracing::debug!(reruns = telemetry.rerun_count(), "done");
    Ok(())
}
