// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `kiln` - operator CLI for the `kilnd` ticket-orchestration daemon.
//!
//! Thin wrapper: loads the same layered configuration `kilnd` uses, then
//! starts/stops/inspects the daemon process via its state-directory lock
//! file. All orchestration logic lives in `kiln-engine`; this binary never
//! talks to a ticketing platform itself.

mod process;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use kiln_core::Config;

#[derive(Parser)]
#[command(name = "kiln", version, about = "Operator CLI for the kilnd orchestration daemon")]
struct Cli {
    /// Path to a TOML config file (defaults follow kilnd's own layering)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start kilnd
    Start {
        /// Run in the foreground instead of detaching
        #[arg(long)]
        foreground: bool,
    },
    /// Stop a running kilnd
    Stop,
    /// Report whether kilnd is running and show its state directory
    Status,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Start { foreground } => start(&config, cli.config.as_deref(), foreground),
        Command::Stop => stop(&config),
        Command::Status => status(&config),
    }
}

fn start(config: &Config, config_path: Option<&std::path::Path>, foreground: bool) -> Result<()> {
    if let Some(pid) = running_pid(config) {
        return Err(anyhow!("kilnd is already running (pid {pid})"));
    }

    if foreground {
        let binary = process::find_kilnd_binary();
        let mut cmd = std::process::Command::new(&binary);
        cmd.arg("--foreground");
        if let Some(path) = config_path {
            cmd.arg("--config").arg(path);
        }
        let status = cmd
            .status()
            .map_err(|e| anyhow!("failed to run {}: {e}", binary.display()))?;
        if !status.success() {
            return Err(anyhow!("kilnd exited with {status}"));
        }
        return Ok(());
    }

    let child = process::start_background(config_path)?;
    println!("kilnd started in background (pid {})", child.id());
    Ok(())
}

fn stop(config: &Config) -> Result<()> {
    let Some(pid) = running_pid(config) else {
        println!("kilnd is not running");
        return Ok(());
    };

    if process::stop(pid, Duration::from_secs(10)) {
        println!("kilnd (pid {pid}) stopped");
        Ok(())
    } else {
        Err(anyhow!("kilnd (pid {pid}) did not exit within the timeout"))
    }
}

fn status(config: &Config) -> Result<()> {
    println!("state dir: {}", config.state_dir.display());
    match running_pid(config) {
        Some(pid) => println!("kilnd is running (pid {pid})"),
        None => println!("kilnd is not running"),
    }
    Ok(())
}

/// Read the PID out of the lock file and confirm the process is alive. A
/// stale lock file (process gone, PID not reused) reports as not running.
fn running_pid(config: &Config) -> Option<u32> {
    let pid: u32 = std::fs::read_to_string(config.lock_path()).ok()?.trim().parse().ok()?;
    process::process_exists(pid).then_some(pid)
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
