// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store: persisted comment cursors and run history. Synchronous by design —
//! a single `rusqlite::Connection` behind a mutex is fast enough that callers
//! take the lock directly rather than round-tripping through a blocking pool.

use kiln_core::{CommentCursor, ItemKey, RunOutcome};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(String),
    #[error("store schema error: {0}")]
    Schema(String),
}

/// One terminal workflow run, as recorded for `run_history` (SPEC_FULL.md §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunHistoryEntry {
    pub id: String,
    pub item: ItemKey,
    pub workflow: String,
    pub started_at_ms: u64,
    pub finished_at_ms: u64,
    pub outcome: RunOutcome,
    pub session_ref: Option<String>,
}

pub trait Store: Send + Sync {
    fn load_cursor(&self, item: &ItemKey) -> Result<CommentCursor, StoreError>;
    fn save_cursor(&self, item: &ItemKey, cursor: &CommentCursor) -> Result<(), StoreError>;

    fn record_run(&self, entry: &RunHistoryEntry) -> Result<(), StoreError>;
    /// Most recent runs for an item, most-recent first.
    fn recent_runs(&self, item: &ItemKey, limit: usize) -> Result<Vec<RunHistoryEntry>, StoreError>;
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
