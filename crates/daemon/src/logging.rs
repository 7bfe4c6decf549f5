// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured logging setup (SPEC_FULL.md §7): `tracing_subscriber::EnvFilter`
//! from `RUST_LOG` (default `info`), a non-blocking file appender, and simple
//! size-based rotation before each startup — the same shape as the teacher
//! daemon's `setup_logging` / `rotate_log_if_needed`. When run attached
//! (`kiln start --foreground`), a second `fmt::layer()` also writes to
//! stdout so the operator sees log output in their own terminal, not just
//! the file.

use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("no parent directory for log path")]
    NoParentDir,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Maximum log file size before rotation (10 MB).
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Number of rotated log files kept (kiln.log.1, .2, .3).
const MAX_ROTATED_LOGS: u32 = 3;

/// Rotate the daemon log file if it exceeds [`MAX_LOG_SIZE`]. Shifts
/// `kiln.log` → `kiln.log.1` → `kiln.log.2` → `kiln.log.3`, dropping the
/// oldest. Best-effort: failures are silently ignored so the daemon still
/// starts.
pub fn rotate_log_if_needed(log_path: &Path) {
    let size = match std::fs::metadata(log_path) {
        Ok(m) => m.len(),
        Err(_) => return,
    };
    if size < MAX_LOG_SIZE {
        return;
    }

    let log_str = log_path.display().to_string();
    for i in (1..MAX_ROTATED_LOGS).rev() {
        let from = format!("{log_str}.{i}");
        let to = format!("{log_str}.{}", i + 1);
        let _ = std::fs::rename(&from, &to);
    }
    let _ = std::fs::rename(log_path, format!("{log_str}.1"));
}

/// Initialise the global `tracing` subscriber: `RUST_LOG`-driven filter,
/// writing to `log_path` through a non-blocking appender, plus a second
/// stdout layer when `foreground` is set (SPEC_FULL.md §7 — file logging
/// "in addition to stdout output when running attached"). The returned
/// guard must be held for the lifetime of the process — dropping it stops
/// the background flush thread.
pub fn setup_logging(
    log_path: &Path,
    foreground: bool,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LoggingError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let parent = log_path.parent().ok_or(LoggingError::NoParentDir)?;
    std::fs::create_dir_all(parent)?;

    let file_name = log_path.file_name().ok_or(LoggingError::NoParentDir)?;
    let file_appender = tracing_appender::rolling::never(parent, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking));

    if foreground {
        registry.with(fmt::layer().with_writer(std::io::stdout)).init();
    } else {
        registry.init();
    }

    Ok(guard)
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
