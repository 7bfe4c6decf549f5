// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The claim/release protocol that guards against two instances (or a human)
//! racing to own the same running label. See SPEC_FULL.md §4.4.

use kiln_adapters::TicketAdapter;
use kiln_core::AdapterError;
use std::sync::Arc;

/// Outcome of a claim attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// This daemon's identity authored the label add; the claim is ours.
    Claimed,
    /// A different actor's add won the race. The label is left in place —
    /// the winner owns it, per SPEC_FULL.md §4.4 step 4.
    RaceLost { actor: String },
}

/// Claims and releases running labels on behalf of one daemon identity.
pub struct RaceGuard {
    adapter: Arc<dyn TicketAdapter>,
    identity: String,
}

impl RaceGuard {
    pub fn new(adapter: Arc<dyn TicketAdapter>, identity: impl Into<String>) -> Self {
        Self {
            adapter,
            identity: identity.into(),
        }
    }

    /// Attempt to claim `label` on `(repo, ticket_id)`. The caller is
    /// responsible for the step-1/2 check ("is a running label already
    /// present") since that reads from the already-fetched `Item`; this
    /// method implements steps 3-5: add, re-read authorship, decide.
    #[tracing::instrument(skip(self), fields(repo, ticket_id, label))]
    pub async fn claim(&self, repo: &str, ticket_id: u64, label: &str) -> Result<ClaimOutcome, AdapterError> {
        self.adapter.add_label(repo, ticket_id, label).await?;
        let actor = self.adapter.last_label_actor(repo, ticket_id, label).await?;
        match actor {
            Some(actor) if actor == self.identity => Ok(ClaimOutcome::Claimed),
            Some(actor) => {
                tracing::warn!(repo, ticket_id, label, actor, "race lost claiming running label");
                Ok(ClaimOutcome::RaceLost { actor })
            }
            // No audit trail available: conservatively treat as our own
            // claim rather than abandon a label we just wrote ourselves.
            None => Ok(ClaimOutcome::Claimed),
        }
    }

    /// Remove `label` — the single commit-point of a workflow outcome
    /// (SPEC_FULL.md §3 invariant 2).
    pub async fn release(&self, repo: &str, ticket_id: u64, label: &str) -> Result<(), AdapterError> {
        self.adapter.remove_label(repo, ticket_id, label).await
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }
}

#[cfg(test)]
#[path = "race_guard_tests.rs"]
mod tests;
