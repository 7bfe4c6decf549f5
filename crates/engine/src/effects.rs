// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The one place that turns an `Effect` into an actual `TicketAdapter` /
//! `Store` call. Every write this engine performs goes through
//! `apply_effect`/`apply_effects` rather than calling the adapter or store
//! directly. `RunnerPool` computes its termination effects as a pure
//! `Vec<Effect>` batch up front and applies them together
//! (`apply_effects`); `ResetController`, `YoloController`, and
//! `CommentReactor` interleave reads (linked PRs, issue body, new comments)
//! with writes, so they construct one `Effect` at a time and apply it
//! inline via `apply_effect` as they go.

use kiln_adapters::TicketAdapter;
use kiln_core::{CoreError, Effect, RunOutcome};
use kiln_storage::{RunHistoryEntry, Store};

fn outcome_of(label: &str) -> RunOutcome {
    match label {
        "success" => RunOutcome::Success { session_ref: None },
        "cancelled" => RunOutcome::Cancelled,
        _ => RunOutcome::Failure {
            reason: label.to_string(),
        },
    }
}

/// Apply one effect. Label/comment/status calls map straight onto the
/// adapter; `RecordRunHistory` and `AdvanceCommentCursor` go to the Store.
pub async fn apply_effect(
    adapter: &dyn TicketAdapter,
    store: &dyn Store,
    effect: &Effect,
) -> Result<(), CoreError> {
    match effect {
        Effect::AddLabel { item, label } => {
            adapter.add_label(&item.repo, item.ticket_id, label).await?;
        }
        Effect::RemoveLabel { item, label } => {
            adapter.remove_label(&item.repo, item.ticket_id, label).await?;
        }
        Effect::SetStatus { item, status } => {
            adapter.set_status(&item.repo, item.ticket_id, status).await?;
        }
        Effect::UpdateBody { item, new_body } => {
            adapter.update_body(&item.repo, item.ticket_id, new_body).await?;
        }
        Effect::SetReaction { comment_id, kind } => {
            adapter.set_reaction(comment_id, *kind).await?;
        }
        Effect::ClosePullRequest { repo, number } => {
            adapter.close_pull_request(repo, *number).await?;
        }
        Effect::DeleteBranch { repo, name } => {
            adapter.delete_branch(repo, name).await?;
        }
        Effect::RecordRunHistory {
            item,
            workflow,
            started_at_ms,
            finished_at_ms,
            outcome,
            session_ref,
        } => {
            let mut outcome = outcome_of(outcome);
            if let (RunOutcome::Success { session_ref: slot }, Some(s)) = (&mut outcome, session_ref) {
                *slot = Some(s.clone());
            }
            let entry = RunHistoryEntry {
                id: format!("{item}-{started_at_ms}"),
                item: item.clone(),
                workflow: workflow.clone(),
                started_at_ms: *started_at_ms,
                finished_at_ms: *finished_at_ms,
                outcome,
                session_ref: session_ref.clone(),
            };
            store
                .record_run(&entry)
                .map_err(|e| CoreError::Storage(e.to_string()))?;
        }
        Effect::AdvanceCommentCursor { item, timestamp } => {
            let mut cursor = store.load_cursor(item).map_err(|e| CoreError::Storage(e.to_string()))?;
            cursor.advance_to(timestamp.clone());
            store
                .save_cursor(item, &cursor)
                .map_err(|e| CoreError::Storage(e.to_string()))?;
        }
    }
    Ok(())
}

/// Apply effects in order, stopping at the first failure. Callers that need
/// best-effort semantics (e.g. `ResetController`) apply effects one at a
/// time instead and keep going past individual failures.
pub async fn apply_effects(
    adapter: &dyn TicketAdapter,
    store: &dyn Store,
    effects: &[Effect],
) -> Result<(), CoreError> {
    for effect in effects {
        apply_effect(adapter, store, effect).await?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "effects_tests.rs"]
mod tests;
