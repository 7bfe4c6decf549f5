//! Test helpers for behavioral specifications of the `kiln` CLI and `kilnd`
//! daemon.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Returns the path to a binary, checking llvm-cov target directory first.
/// Falls back to resolving relative to the test binary itself when
/// CARGO_MANIFEST_DIR is stale (e.g. compiled by a removed worktree into a
/// shared target directory).
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let llvm_cov_path = manifest_dir.join("target/llvm-cov-target/debug").join(name);
    if llvm_cov_path.exists() {
        return llvm_cov_path;
    }

    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

pub fn kiln_binary() -> PathBuf {
    binary_path("kiln")
}

pub fn kilnd_binary() -> PathBuf {
    binary_path("kilnd")
}

/// A temporary, isolated daemon state directory plus the env vars needed to
/// satisfy `Config::load`'s required fields.
pub struct StateDir {
    dir: tempfile::TempDir,
}

impl StateDir {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Build a `kiln` command wired to this state directory.
    pub fn kiln(&self) -> Command {
        let mut cmd = Command::new(kiln_binary());
        cmd.env("KILN_STATE_DIR", self.path());
        cmd.env("KILN_ALLOWED_USERNAME", "automation-bot");
        cmd.env("KILN_DAEMON_IDENTITY", "kilnd-test");
        cmd
    }

    /// Build a `kilnd` command wired to this state directory. No boards are
    /// configured by default, so a running instance never touches the
    /// network - it idles until cancelled.
    pub fn kilnd(&self) -> Command {
        let mut cmd = Command::new(kilnd_binary());
        cmd.env("KILN_STATE_DIR", self.path());
        cmd.env("KILN_ALLOWED_USERNAME", "automation-bot");
        cmd.env("KILN_DAEMON_IDENTITY", "kilnd-test");
        cmd.env("GITHUB_TOKEN", "test-token");
        cmd
    }

    pub fn lock_path(&self) -> PathBuf {
        self.path().join("kiln.lock")
    }
}

/// Poll a condition until it returns true or the timeout elapses.
pub fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_millis(timeout_ms);
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(std::time::Duration::from_millis(10));
    }
    false
}

pub fn process_alive(pid: u32) -> bool {
    Command::new("kill")
        .args(["-0", &pid.to_string()])
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub trait OutputExt {
    fn stdout_string(&self) -> String;
    fn stderr_string(&self) -> String;
}

impl OutputExt for Output {
    fn stdout_string(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    fn stderr_string(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}
