// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error type for the orchestration loop itself, distinct from the
//! `AdapterError`/`StoreError` classifications the core and storage crates
//! carry.

use kiln_core::AdapterError;
use thiserror::Error;

/// Surfaces only what should end the daemon. Non-fatal adapter errors
/// (transient, schema, platform-unreachable) are handled inline by the
/// Poller and never reach this type.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("fatal adapter error: {0}")]
    Adapter(#[from] AdapterError),
}
