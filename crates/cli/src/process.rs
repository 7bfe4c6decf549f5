// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-management helpers for launching and signalling `kilnd`, the
//! daemon binary, from the `kiln` CLI wrapper.

use std::path::PathBuf;
use std::process::Command;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

/// Locate the `kilnd` binary: next to the running `kiln` executable, falling
/// back to whatever `$PATH` resolves.
pub fn find_kilnd_binary() -> PathBuf {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join("kilnd");
            if sibling.exists() {
                return sibling;
            }
        }
    }
    PathBuf::from("kilnd")
}

/// Spawn `kilnd` in the background, detached from this process's stdio.
pub fn start_background(config_path: Option<&std::path::Path>) -> Result<std::process::Child> {
    let binary = find_kilnd_binary();
    let mut cmd = Command::new(&binary);
    if let Some(path) = config_path {
        cmd.arg("--config").arg(path);
    }
    cmd.stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .with_context(|| format!("failed to spawn {}", binary.display()))
}

/// Send SIGTERM to `pid`, then SIGKILL if it hasn't exited within `timeout`.
pub fn stop(pid: u32, timeout: Duration) -> bool {
    kill_signal("-15", pid);

    let start = Instant::now();
    while start.elapsed() < timeout {
        if !process_exists(pid) {
            return true;
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    kill_signal("-9", pid);
    let start = Instant::now();
    while start.elapsed() < timeout {
        if !process_exists(pid) {
            return true;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    !process_exists(pid)
}

fn kill_signal(signal: &str, pid: u32) -> bool {
    Command::new("kill")
        .args([signal, &pid.to_string()])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Check whether a process with the given PID is alive.
pub fn process_exists(pid: u32) -> bool {
    kill_signal("-0", pid)
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
