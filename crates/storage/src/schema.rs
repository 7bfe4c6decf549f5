// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Versioned schema migrations against `PRAGMA user_version`, applied once
//! at connection open.

use rusqlite::Connection;

const MIGRATIONS: &[&str] = &[
    // v0 -> v1
    r#"
    CREATE TABLE issue_state (
        repo TEXT NOT NULL,
        ticket_id INTEGER NOT NULL,
        updated_at INTEGER NOT NULL,
        last_comment_at TEXT,
        PRIMARY KEY (repo, ticket_id)
    );
    CREATE TABLE run_history (
        id TEXT PRIMARY KEY,
        repo TEXT NOT NULL,
        ticket_id INTEGER NOT NULL,
        workflow TEXT NOT NULL,
        started_at INTEGER NOT NULL,
        finished_at INTEGER NOT NULL,
        outcome TEXT NOT NULL,
        reason TEXT,
        session_ref TEXT
    );
    CREATE INDEX run_history_item_idx ON run_history (repo, ticket_id, finished_at);
    "#,
];

pub fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    let current: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    for (i, statements) in MIGRATIONS.iter().enumerate().skip(current as usize) {
        conn.execute_batch(statements)?;
        conn.pragma_update(None, "user_version", (i + 1) as u32)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
