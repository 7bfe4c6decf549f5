// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concrete `Store` over a single `rusqlite::Connection` behind a mutex —
//! connection-per-daemon, not connection-per-thread, since this is a
//! single-process daemon (SPEC_FULL.md §5).

use crate::schema;
use crate::store::{RunHistoryEntry, Store, StoreError};
use kiln_core::{Clock, CommentCursor, ItemKey, RunOutcome, SystemClock};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Io(e.to_string()))?;
        schema::migrate(&conn).map_err(|e| StoreError::Schema(e.to_string()))?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError::Io(e.to_string()))?;
        schema::migrate(&conn).map_err(|e| StoreError::Schema(e.to_string()))?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

fn outcome_to_parts(outcome: &RunOutcome) -> (&'static str, Option<String>, Option<String>) {
    match outcome {
        RunOutcome::Success { session_ref } => ("success", None, session_ref.clone()),
        RunOutcome::Failure { reason } => ("failure", Some(reason.clone()), None),
        RunOutcome::Cancelled => ("cancelled", None, None),
    }
}

fn parts_to_outcome(outcome: &str, reason: Option<String>, session_ref: Option<String>) -> RunOutcome {
    match outcome {
        "success" => RunOutcome::Success { session_ref },
        "cancelled" => RunOutcome::Cancelled,
        _ => RunOutcome::Failure {
            reason: reason.unwrap_or_default(),
        },
    }
}

impl Store for SqliteStore {
    fn load_cursor(&self, item: &ItemKey) -> Result<CommentCursor, StoreError> {
        let conn = self.conn.lock();
        let last_seen_at: Option<String> = conn
            .query_row(
                "SELECT last_comment_at FROM issue_state WHERE repo = ?1 AND ticket_id = ?2",
                params![item.repo, item.ticket_id as i64],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StoreError::Io(e.to_string()))?
            .flatten();
        Ok(CommentCursor { last_seen_at })
    }

    fn save_cursor(&self, item: &ItemKey, cursor: &CommentCursor) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        let now = kiln_core::SystemClock.epoch_ms() as i64;
        conn.execute(
            "INSERT INTO issue_state (repo, ticket_id, updated_at, last_comment_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (repo, ticket_id)
             DO UPDATE SET updated_at = excluded.updated_at, last_comment_at = excluded.last_comment_at",
            params![item.repo, item.ticket_id as i64, now, cursor.last_seen_at],
        )
        .map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(())
    }

    fn record_run(&self, entry: &RunHistoryEntry) -> Result<(), StoreError> {
        let (outcome, reason, session_ref) = outcome_to_parts(&entry.outcome);
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO run_history
                (id, repo, ticket_id, workflow, started_at, finished_at, outcome, reason, session_ref)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                entry.id,
                entry.item.repo,
                entry.item.ticket_id as i64,
                entry.workflow,
                entry.started_at_ms as i64,
                entry.finished_at_ms as i64,
                outcome,
                reason,
                session_ref,
            ],
        )
        .map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(())
    }

    fn recent_runs(&self, item: &ItemKey, limit: usize) -> Result<Vec<RunHistoryEntry>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT id, workflow, started_at, finished_at, outcome, reason, session_ref
                 FROM run_history
                 WHERE repo = ?1 AND ticket_id = ?2
                 ORDER BY finished_at DESC
                 LIMIT ?3",
            )
            .map_err(|e| StoreError::Io(e.to_string()))?;
        let rows = stmt
            .query_map(params![item.repo, item.ticket_id as i64, limit as i64], |row| {
                let outcome: String = row.get(4)?;
                let reason: Option<String> = row.get(5)?;
                let session_ref: Option<String> = row.get(6)?;
                Ok(RunHistoryEntry {
                    id: row.get(0)?,
                    item: item.clone(),
                    workflow: row.get(1)?,
                    started_at_ms: row.get::<_, i64>(2)? as u64,
                    finished_at_ms: row.get::<_, i64>(3)? as u64,
                    outcome: parts_to_outcome(&outcome, reason, session_ref.clone()),
                    session_ref,
                })
            })
            .map_err(|e| StoreError::Io(e.to_string()))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Io(e.to_string()))
    }
}

#[cfg(test)]
#[path = "sqlite_tests.rs"]
mod tests;
