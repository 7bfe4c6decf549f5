// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TriggerPolicy: the pure per-item rule table that decides what, if
//! anything, happens to a ticket this cycle.

use crate::item::Item;
use crate::label::{LabelModel, Stage, Status, RUNNING_LABELS};

/// What the Poller should do about one item this cycle. `evaluate` is a
/// pure function of `(item, context)` — it performs no I/O and holds no
/// state.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Nothing to do this cycle.
    None,
    /// Start the given stage under its running label.
    RunWorkflow(Stage),
    /// Respond to a new actionable comment by running the in-place editor.
    IterateComment,
    /// Yolo-advance the item to the next status.
    Advance(Status),
    /// The `reset` label is present; hand off to ResetController. Not
    /// enumerated among the source's five named variants but required by
    /// rule 1 — see DESIGN.md.
    Reset,
    /// A running label is present with no locally-tracked run; recover it
    /// (subject to the actor check performed by the caller, see §4.6).
    RecoverStaleLabel(&'static str),
    /// More than one running label present on the same item at once — the
    /// defensive `InvariantViolation` case (§7): log ERROR and strip all of
    /// them unconditionally, no actor check.
    StripInvariantLabels(Vec<&'static str>),
    /// Item reached Done or was closed; release resources.
    Cleanup,
}

/// Everything the pure rule table needs but can't derive from the item
/// itself, because it depends on process-local state (the RunnerPool) or a
/// cheap side query the Poller already performed.
#[derive(Debug, Clone, Copy, Default)]
pub struct TriggerContext {
    /// Whether the RunnerPool has an active RunRecord for this item.
    pub has_local_run: bool,
    /// Whether a comment newer than the stored CommentCursor exists.
    pub has_unprocessed_comment: bool,
    /// Whether this daemon should trigger a fresh Research run when an item
    /// in Backlog carries `yolo` — resolved open question, see DESIGN.md.
    pub yolo_triggers_backlog: bool,
    /// Set by the caller when `last_status_actor` names an actor who is
    /// neither this daemon nor the configured `ALLOWED_USERNAME` (§7):
    /// blocks rule 4/5 from treating the current status as a legitimate
    /// trigger. `false` (the default) also covers the common case where no
    /// actor is attributable at all.
    pub status_actor_blocked: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TriggerPolicy {
    labels: LabelModel,
    /// `WATCHED_STATUSES` (SPEC_FULL.md §10): which columns may trigger a
    /// fresh `RunWorkflow`. `None` watches all three stages (the default).
    watched: Option<Vec<String>>,
}

impl TriggerPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict stage-triggering (rule 4) to the given status names. A
    /// status absent from this list is never auto-triggered, even if it maps
    /// to a known `Stage` — it can still be advanced into manually or by
    /// yolo from an upstream stage.
    pub fn with_watched_statuses(statuses: Vec<String>) -> Self {
        Self {
            labels: LabelModel,
            watched: Some(statuses),
        }
    }

    fn is_watched(&self, status: &Status) -> bool {
        match &self.watched {
            None => true,
            Some(list) => list.iter().any(|s| s == status.as_str()),
        }
    }

    pub fn evaluate(&self, item: &Item, ctx: &TriggerContext) -> Decision {
        // Rule 1: reset takes priority over everything else.
        if item.has_label("reset") {
            return Decision::Reset;
        }

        // Rule 2: terminal items get cleaned up, not worked on.
        if !item.open || item.status == Status::Done {
            return Decision::Cleanup;
        }

        // Rule 3: any running label present is handled here in full —
        // either it's stale (no local run owns it) and gets scheduled for
        // recovery, or it's legitimately in flight and we do nothing.
        let running = self.labels.running_labels_present(&item.labels);
        if running.len() > 1 {
            // Two running labels on one item violates invariant 1 (§3) and
            // can't be the product of a normal claim — repair unconditionally.
            let owned: Vec<&'static str> = running
                .iter()
                .filter_map(|l| RUNNING_LABELS.iter().find(|&&r| r == *l).copied())
                .collect();
            return Decision::StripInvariantLabels(owned);
        }
        if let Some(&label) = running.first() {
            return if ctx.has_local_run {
                Decision::None
            } else {
                Decision::RecoverStaleLabel(label)
            };
        }

        // Rule 4: no running label, no ready label yet — start the stage,
        // unless this status has been configured out of WATCHED_STATUSES or
        // an unauthorized actor is the one who put it here (§7).
        if let Some(stage) = Stage::from_status(&item.status) {
            let ready = stage.ready_label();
            let has_ready = ready.map(|l| item.has_label(l)).unwrap_or(false);
            if !has_ready && self.is_watched(&item.status) && !ctx.status_actor_blocked {
                return Decision::RunWorkflow(stage);
            }

            // Rule 5: ready + yolo advances to the next status. Restricted to
            // Research/Plan (Implement has no yolo-advance per SPEC_FULL.md
            // §4.2 rule 5) and gated by the same actor check as rule 4.
            if matches!(item.status, Status::Research | Status::Plan)
                && has_ready
                && item.has_label("yolo")
                && !ctx.status_actor_blocked
            {
                return Decision::Advance(stage.next_status());
            }
        }

        // Backlog + yolo: resolved open question (see DESIGN.md). Treated as
        // its own branch because Backlog has no Stage of its own.
        if item.status == Status::Backlog
            && item.has_label("yolo")
            && ctx.yolo_triggers_backlog
            && !ctx.status_actor_blocked
        {
            return Decision::Advance(Status::Research);
        }

        // Rule 6: comment iteration, Research/Plan only — never Implement
        // ("no PR-stage vibe-coding").
        let iterable = matches!(item.status, Status::Research | Status::Plan);
        if iterable && ctx.has_unprocessed_comment {
            return Decision::IterateComment;
        }

        // Rule 7.
        Decision::None
    }
}

#[cfg(test)]
#[path = "decision_tests.rs"]
mod tests;
