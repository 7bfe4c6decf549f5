// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects are the side effects components decide on; the engine's effect
//! executor is the only thing that actually talks to the TicketAdapter and
//! Store. Keeping the decision (what to do) separate from the execution
//! (how to do it) is what makes TriggerPolicy and friends pure and testable.

use crate::item::ItemKey;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionKind {
    Eyes,
    ThumbsUp,
    Confused,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    AddLabel {
        item: ItemKey,
        label: String,
    },
    RemoveLabel {
        item: ItemKey,
        label: String,
    },
    SetStatus {
        item: ItemKey,
        status: String,
    },
    UpdateBody {
        item: ItemKey,
        new_body: String,
    },
    SetReaction {
        comment_id: String,
        kind: ReactionKind,
    },
    ClosePullRequest {
        repo: String,
        number: u64,
    },
    DeleteBranch {
        repo: String,
        name: String,
    },
    RecordRunHistory {
        item: ItemKey,
        workflow: String,
        started_at_ms: u64,
        finished_at_ms: u64,
        outcome: String,
        session_ref: Option<String>,
    },
    AdvanceCommentCursor {
        item: ItemKey,
        timestamp: String,
    },
}

impl Effect {
    /// Short name used for structured logging (`tracing::info!(effect =
    /// effect.name(), ...)`), mirroring the teacher's `Effect::name`.
    pub fn name(&self) -> &'static str {
        match self {
            Effect::AddLabel { .. } => "add_label",
            Effect::RemoveLabel { .. } => "remove_label",
            Effect::SetStatus { .. } => "set_status",
            Effect::UpdateBody { .. } => "update_body",
            Effect::SetReaction { .. } => "set_reaction",
            Effect::ClosePullRequest { .. } => "close_pull_request",
            Effect::DeleteBranch { .. } => "delete_branch",
            Effect::RecordRunHistory { .. } => "record_run_history",
            Effect::AdvanceCommentCursor { .. } => "advance_comment_cursor",
        }
    }

    /// The item this effect targets, if any (deletion/close effects are
    /// scoped by repo only).
    pub fn item(&self) -> Option<&ItemKey> {
        match self {
            Effect::AddLabel { item, .. }
            | Effect::RemoveLabel { item, .. }
            | Effect::SetStatus { item, .. }
            | Effect::UpdateBody { item, .. }
            | Effect::RecordRunHistory { item, .. }
            | Effect::AdvanceCommentCursor { item, .. } => Some(item),
            Effect::SetReaction { .. } | Effect::ClosePullRequest { .. } | Effect::DeleteBranch { .. } => None,
        }
    }
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;
