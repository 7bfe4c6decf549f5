// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Comment-driven edit workflows (SPEC_FULL.md §4.7), triggered by
//! `Decision::IterateComment`. Disabled for Implement — no PR-stage
//! vibe-coding.

use crate::effects::apply_effect;
use crate::race_guard::{ClaimOutcome, RaceGuard};
use kiln_adapters::{TicketAdapter, WorkflowExecutor};
use kiln_core::{Comment, CommentCursor, CoreError, Effect, ItemKey, ReactionKind, RunOutcome, Stage};
use kiln_storage::Store;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

pub const EDITING_LABEL: &str = "editing";

/// Picks the oldest actionable comment out of a freshly-fetched batch: newer
/// than the cursor, not authored by this daemon, authored by the one
/// configured allowed actor (SPEC_FULL.md §7).
pub fn select_actionable<'a>(
    comments: &'a [Comment],
    cursor: &CommentCursor,
    daemon_identity: &str,
    allowed_username: &str,
) -> Option<&'a Comment> {
    comments
        .iter()
        .filter(|c| cursor.is_new(c) && c.author != daemon_identity && c.author == allowed_username)
        .min_by(|a, b| a.created_at.cmp(&b.created_at))
}

/// True when `select_actionable` would find something — used to populate
/// `TriggerContext::has_unprocessed_comment` without duplicating the fetch.
pub fn has_actionable(
    comments: &[Comment],
    cursor: &CommentCursor,
    daemon_identity: &str,
    allowed_username: &str,
) -> bool {
    select_actionable(comments, cursor, daemon_identity, allowed_username).is_some()
}

/// Runs the in-place editor for the oldest actionable comment on an item.
/// Keeps its own small active-item set, separate from `RunnerPool`'s, since
/// an edit run's termination effects (cursor advance, reaction) don't match
/// a stage run's (ready/failure label).
pub struct CommentReactor {
    adapter: Arc<dyn TicketAdapter>,
    store: Arc<dyn Store>,
    executor: Arc<dyn WorkflowExecutor>,
    identity: String,
    allowed_username: String,
    active: Arc<Mutex<HashSet<ItemKey>>>,
    cancels: Arc<Mutex<std::collections::HashMap<ItemKey, CancellationToken>>>,
    handles: Mutex<Vec<tokio::task::JoinHandle<()>>>,
}

impl CommentReactor {
    pub fn new(
        adapter: Arc<dyn TicketAdapter>,
        store: Arc<dyn Store>,
        executor: Arc<dyn WorkflowExecutor>,
        identity: impl Into<String>,
        allowed_username: impl Into<String>,
    ) -> Self {
        Self {
            adapter,
            store,
            executor,
            identity: identity.into(),
            allowed_username: allowed_username.into(),
            active: Arc::new(Mutex::new(HashSet::new())),
            cancels: Arc::new(Mutex::new(std::collections::HashMap::new())),
            handles: Mutex::new(Vec::new()),
        }
    }

    pub fn has_active_run(&self, item: &ItemKey) -> bool {
        self.active.lock().contains(item)
    }

    /// Signal every in-flight edit workflow's cancellation token (shutdown
    /// path, SPEC_FULL.md §5 — symmetric with `RunnerPool::cancel_all`).
    pub fn cancel_all(&self) {
        for cancel in self.cancels.lock().values() {
            cancel.cancel();
        }
    }

    /// Wait for every dispatched edit workflow to exit (shutdown path,
    /// SPEC_FULL.md §5 — symmetric with `RunnerPool::drain`).
    pub async fn drain(&self) {
        let handles: Vec<_> = self.handles.lock().drain(..).collect();
        for handle in handles {
            if let Err(e) = handle.await {
                if e.is_panic() {
                    tracing::error!("comment edit task panicked during shutdown drain");
                }
            }
        }
    }

    /// Cheap existence check used to populate
    /// `TriggerContext::has_unprocessed_comment` — fetches the same way
    /// `react` does but doesn't act on the result.
    pub async fn has_unprocessed_comment(&self, item: &ItemKey) -> Result<bool, CoreError> {
        let cursor = self
            .store
            .load_cursor(item)
            .map_err(|e| CoreError::Storage(e.to_string()))?;
        let comments = self
            .adapter
            .list_comments_since(&item.repo, item.ticket_id, cursor.last_seen_at.as_deref())
            .await?;
        Ok(has_actionable(&comments, &cursor, &self.identity, &self.allowed_username))
    }

    /// Attempt to dispatch an edit workflow for `item` at `stage`, scoped by
    /// `Decision::IterateComment` to Research/Plan only. Fetches comments
    /// itself, claims `editing` via the race guard, and on success spawns the
    /// workflow; on a lost race or no actionable comment, does nothing.
    #[tracing::instrument(skip(self, race_guard), fields(repo = %item.repo, ticket_id = item.ticket_id))]
    pub async fn react(&self, item: &ItemKey, stage: Stage, race_guard: &RaceGuard) -> Result<bool, CoreError> {
        if stage == Stage::Implement {
            return Ok(false);
        }
        if self.active.lock().contains(item) {
            return Ok(false);
        }

        let cursor = self
            .store
            .load_cursor(item)
            .map_err(|e| CoreError::Storage(e.to_string()))?;
        let comments = self
            .adapter
            .list_comments_since(&item.repo, item.ticket_id, cursor.last_seen_at.as_deref())
            .await?;
        let Some(comment) = select_actionable(&comments, &cursor, &self.identity, &self.allowed_username).cloned()
        else {
            return Ok(false);
        };

        let eyes = Effect::SetReaction {
            comment_id: comment.id.clone(),
            kind: ReactionKind::Eyes,
        };
        apply_effect(self.adapter.as_ref(), self.store.as_ref(), &eyes).await?;

        match race_guard.claim(&item.repo, item.ticket_id, EDITING_LABEL).await? {
            ClaimOutcome::RaceLost { .. } => return Ok(false),
            ClaimOutcome::Claimed => {}
        }

        self.active.lock().insert(item.clone());
        let cancel = CancellationToken::new();
        self.cancels.lock().insert(item.clone(), cancel.clone());

        let adapter = Arc::clone(&self.adapter);
        let store = Arc::clone(&self.store);
        let executor = Arc::clone(&self.executor);
        let identity = self.identity.clone();
        let active = Arc::clone(&self.active);
        let cancels = Arc::clone(&self.cancels);
        let item = item.clone();
        let span = tracing::info_span!("comment_edit", repo = %item.repo, ticket_id = item.ticket_id);

        let handle = tokio::spawn(
            async move {
                let outcome = executor
                    .run(stage, &item, &identity, cancel)
                    .await
                    .unwrap_or_else(|e| RunOutcome::Failure { reason: e.to_string() });

                let release_editing = Effect::RemoveLabel {
                    item: item.clone(),
                    label: EDITING_LABEL.to_string(),
                };
                if let Err(e) = apply_effect(adapter.as_ref(), store.as_ref(), &release_editing).await {
                    tracing::error!(error = %e, "failed to release editing label");
                }

                match outcome {
                    RunOutcome::Success { .. } => {
                        let processed = Effect::SetReaction {
                            comment_id: comment.id.clone(),
                            kind: ReactionKind::ThumbsUp,
                        };
                        if let Err(e) = apply_effect(adapter.as_ref(), store.as_ref(), &processed).await {
                            tracing::error!(error = %e, "failed to mark comment processed");
                        }
                        let advance_cursor = Effect::AdvanceCommentCursor {
                            item: item.clone(),
                            timestamp: comment.created_at.clone(),
                        };
                        if let Err(e) = apply_effect(adapter.as_ref(), store.as_ref(), &advance_cursor).await {
                            tracing::error!(error = %e, "failed to advance comment cursor");
                        }
                    }
                    RunOutcome::Failure { .. } | RunOutcome::Cancelled => {
                        let failed = Effect::SetReaction {
                            comment_id: comment.id.clone(),
                            kind: ReactionKind::Confused,
                        };
                        if let Err(e) = apply_effect(adapter.as_ref(), store.as_ref(), &failed).await {
                            tracing::error!(error = %e, "failed to mark comment failed");
                        }
                    }
                }

                active.lock().remove(&item);
                cancels.lock().remove(&item);
            }
            .instrument(span),
        );
        let mut handles = self.handles.lock();
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
        drop(handles);

        Ok(true)
    }
}

#[cfg(test)]
#[path = "comment_reactor_tests.rs"]
mod tests;
