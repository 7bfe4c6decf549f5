// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! kiln-daemon: process lifecycle for the `kilnd` binary — state-directory
//! resolution, the exclusive lock file, and log rotation. The orchestration
//! logic itself lives in `kiln-engine`; this crate only wires it to a real
//! process (signals, a log file, a lock file) the way the teacher's `ojd`
//! wires its own event loop to the OS.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod lifecycle;
pub mod logging;

pub use lifecycle::{acquire_lock, LifecycleError, LockGuard};
pub use logging::{rotate_log_if_needed, setup_logging};
