// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use kiln_core::RunOutcome;

#[test]
fn run_history_entry_carries_the_outcome_verbatim() {
    let entry = RunHistoryEntry {
        id: "r1".to_string(),
        item: ItemKey::new("acme/widgets", 1),
        workflow: "research".to_string(),
        started_at_ms: 1_000,
        finished_at_ms: 2_000,
        outcome: RunOutcome::Success {
            session_ref: Some("session-abc".to_string()),
        },
        session_ref: Some("session-abc".to_string()),
    };
    assert_eq!(entry.finished_at_ms - entry.started_at_ms, 1_000);
    assert!(matches!(entry.outcome, RunOutcome::Success { .. }));
}
