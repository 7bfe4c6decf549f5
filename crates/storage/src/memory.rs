// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory `Store` for tests — the same role `FakeTicketAdapter` plays in
//! `kiln-adapters`, gated behind the same `test-support` feature.

use crate::store::{RunHistoryEntry, Store, StoreError};
use kiln_core::{CommentCursor, ItemKey};
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Default)]
pub struct InMemoryStore {
    cursors: Mutex<HashMap<ItemKey, CommentCursor>>,
    runs: Mutex<HashMap<ItemKey, Vec<RunHistoryEntry>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for InMemoryStore {
    fn load_cursor(&self, item: &ItemKey) -> Result<CommentCursor, StoreError> {
        Ok(self.cursors.lock().get(item).cloned().unwrap_or_default())
    }

    fn save_cursor(&self, item: &ItemKey, cursor: &CommentCursor) -> Result<(), StoreError> {
        self.cursors.lock().insert(item.clone(), cursor.clone());
        Ok(())
    }

    fn record_run(&self, entry: &RunHistoryEntry) -> Result<(), StoreError> {
        self.runs.lock().entry(entry.item.clone()).or_default().push(entry.clone());
        Ok(())
    }

    fn recent_runs(&self, item: &ItemKey, limit: usize) -> Result<Vec<RunHistoryEntry>, StoreError> {
        let runs = self.runs.lock();
        let mut entries = runs.get(item).cloned().unwrap_or_default();
        entries.sort_by(|a, b| b.finished_at_ms.cmp(&a.finished_at_ms));
        entries.truncate(limit);
        Ok(entries)
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
