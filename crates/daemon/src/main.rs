// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! kilnd: the orchestration daemon binary. Loads configuration, takes the
//! state-directory lock, wires the `TicketAdapter` / `Store` /
//! `WorkflowExecutor` capabilities to the `kiln-engine` Poller, and runs
//! until SIGINT/SIGTERM (SPEC_FULL.md §4.6, §5, §10).

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use kiln_adapters::{Board, GitHubTicketAdapter, ProcessWorkflowExecutor, TicketAdapter, WorkflowExecutor};
use kiln_core::{Config, SystemClock};
use kiln_daemon::lifecycle::{self, LifecycleError};
use kiln_daemon::logging;
use kiln_engine::Poller;
use kiln_storage::{SqliteStore, Store};
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    match run().await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("kilnd: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut config_path: Option<PathBuf> = None;
    let mut foreground = false;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("kilnd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--config" => {
                let path = args.next().ok_or("--config requires a path argument")?;
                config_path = Some(PathBuf::from(path));
            }
            "--foreground" => foreground = true,
            other => return Err(format!("unexpected argument '{other}', see --help").into()),
        }
    }

    let config = Config::load(config_path.as_deref())?;

    logging::rotate_log_if_needed(&config.log_path());
    let _log_guard = logging::setup_logging(&config.log_path(), foreground)?;

    let lock = match lifecycle::acquire_lock(&config.lock_path()) {
        Ok(lock) => lock,
        Err(LifecycleError::LockFailed { path, .. }) => {
            let pid = std::fs::read_to_string(&path).unwrap_or_default();
            eprintln!("kilnd is already running (pid: {})", pid.trim());
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };
    info!(lock_path = %lock.path().display(), "acquired state-directory lock");

    let adapter: Arc<dyn TicketAdapter> = Arc::new(GitHubTicketAdapter::new(
        std::env::var("KILN_GITHUB_BASE_URL").unwrap_or_else(|_| "https://api.github.com".to_string()),
        std::env::var("GITHUB_TOKEN").map_err(|_| "GITHUB_TOKEN must be set")?,
    ));
    let store: Arc<dyn Store> = Arc::new(SqliteStore::open(&config.db_path())?);
    let executor: Arc<dyn WorkflowExecutor> = Arc::new(ProcessWorkflowExecutor::new(
        std::env::var("KILN_AGENT_BINARY").unwrap_or_else(|_| "claude".to_string()),
        std::env::var("KILN_WORKDIR").map(PathBuf::from).unwrap_or_else(|_| config.state_dir.join("workspace")),
    ));
    let clock = Arc::new(SystemClock);

    let boards: Vec<Board> = config
        .boards
        .iter()
        .map(|b| Board {
            repo: b.repo.clone(),
            project: b.project.clone(),
        })
        .collect();
    if boards.is_empty() {
        tracing::warn!("no boards configured; kilnd will idle forever");
    }

    let cancel = CancellationToken::new();
    let poller = Poller::new(
        boards,
        adapter,
        store,
        executor,
        clock,
        config.daemon_identity.clone(),
        config.allowed_username.clone(),
        config.max_concurrent_workflows,
        config.poll_interval,
        Duration::from_secs(300),
        config.hibernation_probe_interval,
        config.stale_threshold,
        config.watched_statuses.clone(),
        cancel.clone(),
    );

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let shutdown_cancel = cancel.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
            _ = sigint.recv() => info!("received SIGINT, shutting down"),
        }
        shutdown_cancel.cancel();
    });

    println!("READY");
    info!("kilnd ready, polling {} board(s)", config.boards.len());

    if let Err(e) = poller.run().await {
        error!(error = %e, "poller exited with a fatal error");
        return Err(e.into());
    }

    info!("kilnd stopped cleanly");
    Ok(())
}

fn print_help() {
    println!("kilnd {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Orchestration daemon driving tickets through Research -> Plan -> Implement.");
    println!();
    println!("USAGE:");
    println!("    kilnd [--config <path>]");
    println!();
    println!("OPTIONS:");
    println!("    --config <path>  Optional TOML config file (env vars take precedence)");
    println!("    --foreground     Also log to stdout, for when kilnd is run attached");
    println!("    -h, --help       Print help information");
    println!("    -V, --version    Print version information");
}
