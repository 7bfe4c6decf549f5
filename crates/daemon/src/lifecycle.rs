// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-level startup: the exclusive lock file that keeps two `kilnd`
//! instances from sharing one state directory (SPEC_FULL.md §10), following
//! the teacher daemon's `try_lock_exclusive` + PID-file idiom.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("failed to acquire lock at {path}: kilnd already running?")]
    LockFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Holds the exclusive lock on `lock_path` for the lifetime of the daemon
/// process. The lock is released automatically when this is dropped.
pub struct LockGuard {
    #[allow(dead_code)]
    file: File,
    path: PathBuf,
}

impl LockGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Acquire the exclusive state-directory lock, writing this process's PID
/// into it. Returns `LifecycleError::LockFailed` if another instance
/// already holds it — the caller reads the existing PID out of the file to
/// print a human-readable "already running" message.
pub fn acquire_lock(lock_path: &Path) -> Result<LockGuard, LifecycleError> {
    if let Some(parent) = lock_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Avoid truncating before we hold the lock — that would wipe the
    // running daemon's PID out from under it.
    let file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)?;
    file.try_lock_exclusive()
        .map_err(|source| LifecycleError::LockFailed {
            path: lock_path.to_path_buf(),
            source,
        })?;

    let mut file = file;
    file.set_len(0)?;
    writeln!(file, "{}", std::process::id())?;

    Ok(LockGuard {
        file,
        path: lock_path.to_path_buf(),
    })
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
