// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The top-level loop (SPEC_FULL.md §4.6): fetch each board, evaluate the
//! trigger policy per item, dispatch to the matching component, sweep stale
//! runs, then sleep for whatever the backoff/hibernation state prescribes.

use crate::comment_reactor::CommentReactor;
use crate::hibernation::HibernationControl;
use crate::race_guard::{ClaimOutcome, RaceGuard};
use crate::reset;
use crate::runner_pool::RunnerPool;
use crate::yolo;
use crate::EngineError;
use kiln_adapters::{Board, TicketAdapter, WorkflowExecutor};
use kiln_core::{BackoffController, Clock, Decision, Item, ItemKey, Stage, Status, TriggerContext, TriggerPolicy};
use kiln_storage::Store;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const CLEANUP_MARKER: &str = "cleaned_up";

/// One full pass over every configured board.
pub enum CycleOutcome {
    Success,
    Degraded,
    Hibernating,
}

pub struct Poller {
    boards: Vec<Board>,
    adapter: Arc<dyn TicketAdapter>,
    store: Arc<dyn Store>,
    identity: String,
    allowed_username: String,
    policy: TriggerPolicy,
    race_guard: RaceGuard,
    runner_pool: RunnerPool,
    comment_reactor: CommentReactor,
    backoff: BackoffController,
    hibernation: HibernationControl,
    hibernation_probe_interval: Duration,
    clock: Arc<dyn Clock>,
    stale_threshold: Duration,
    cancel: CancellationToken,
}

impl Poller {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        boards: Vec<Board>,
        adapter: Arc<dyn TicketAdapter>,
        store: Arc<dyn Store>,
        executor: Arc<dyn WorkflowExecutor>,
        clock: Arc<dyn Clock>,
        identity: impl Into<String>,
        allowed_username: impl Into<String>,
        max_concurrent_workflows: usize,
        backoff_base: Duration,
        backoff_ceiling: Duration,
        hibernation_probe_interval: Duration,
        stale_threshold: Duration,
        watched_statuses: Vec<String>,
        cancel: CancellationToken,
    ) -> Self {
        let identity = identity.into();
        let allowed_username = allowed_username.into();
        let race_guard = RaceGuard::new(Arc::clone(&adapter), identity.clone());
        let runner_pool = RunnerPool::new(
            max_concurrent_workflows,
            Arc::clone(&adapter),
            Arc::clone(&store),
            Arc::clone(&executor),
            Arc::clone(&clock),
        );
        let comment_reactor = CommentReactor::new(
            Arc::clone(&adapter),
            Arc::clone(&store),
            Arc::clone(&executor),
            identity.clone(),
            allowed_username.clone(),
        );
        Self {
            boards,
            adapter,
            store,
            identity,
            allowed_username,
            policy: TriggerPolicy::with_watched_statuses(watched_statuses),
            race_guard,
            runner_pool,
            comment_reactor,
            backoff: BackoffController::new(backoff_base, backoff_ceiling),
            hibernation: HibernationControl::new(),
            hibernation_probe_interval,
            clock,
            stale_threshold,
            cancel,
        }
    }

    /// Runs until `cancel` fires, then waits for active workflows to drain.
    pub async fn run(mut self) -> Result<(), EngineError> {
        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            let outcome = self.run_cycle().await?;
            self.runner_pool
                .sweep_stale(self.clock.epoch_ms(), self.stale_threshold.as_millis() as u64);

            let sleep = match outcome {
                CycleOutcome::Hibernating => self.hibernation_probe_interval,
                CycleOutcome::Success => self.backoff.on_cycle_outcome(true),
                CycleOutcome::Degraded => self.backoff.on_cycle_outcome(false),
            };

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(sleep) => {}
            }
        }

        self.runner_pool.cancel_all();
        self.comment_reactor.cancel_all();
        self.runner_pool.drain().await;
        self.comment_reactor.drain().await;
        Ok(())
    }

    /// One pass over every board. Returns the aggregate outcome used to pick
    /// the next sleep; only authentication/scope errors are fatal.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome, EngineError> {
        if self.hibernation.is_hibernating() {
            return self.probe().await;
        }

        let mut degraded = false;
        let mut platform_down = false;

        for board in self.boards.clone() {
            match self.adapter.list_items(&board).await {
                Ok(items) => {
                    for item in items {
                        self.handle_item(&item).await;
                    }
                }
                Err(e) if e.is_fatal() => return Err(EngineError::Adapter(e)),
                Err(e) if e.is_platform_unreachable() => {
                    platform_down = true;
                }
                Err(e) => {
                    tracing::warn!(repo = %board.repo, error = %e, "board fetch failed, skipping this cycle");
                    degraded = true;
                }
            }
        }

        if platform_down {
            self.hibernation.enter();
            return Ok(CycleOutcome::Hibernating);
        }

        Ok(if degraded {
            CycleOutcome::Degraded
        } else {
            CycleOutcome::Success
        })
    }

    async fn probe(&mut self) -> Result<CycleOutcome, EngineError> {
        let Some(board) = self.boards.first().cloned() else {
            return Ok(CycleOutcome::Hibernating);
        };
        match self.adapter.list_items(&board).await {
            Ok(_) => {
                self.hibernation.resume();
                Ok(CycleOutcome::Success)
            }
            Err(e) if e.is_fatal() => Err(EngineError::Adapter(e)),
            Err(_) => Ok(CycleOutcome::Hibernating),
        }
    }

    async fn handle_item(&self, item: &Item) {
        let has_local_run =
            self.runner_pool.has_active_run(&item.key) || self.comment_reactor.has_active_run(&item.key);
        let has_unprocessed_comment = if matches!(item.status, Status::Research | Status::Plan) {
            self.comment_reactor
                .has_unprocessed_comment(&item.key)
                .await
                .unwrap_or(false)
        } else {
            false
        };

        let status_actor_blocked = self.status_actor_blocked(item).await;

        let ctx = TriggerContext {
            has_local_run,
            has_unprocessed_comment,
            // Resolved open question (see DESIGN.md): yolo on a Backlog item
            // triggers a fresh Research run.
            yolo_triggers_backlog: true,
            status_actor_blocked,
        };

        match self.policy.evaluate(item, &ctx) {
            Decision::None => {}
            Decision::Cleanup => self.cleanup(item).await,
            Decision::Reset => reset::run(self.adapter.as_ref(), self.store.as_ref(), &item.key).await,
            Decision::RecoverStaleLabel(label) => self.recover_stale_label(&item.key, label).await,
            Decision::StripInvariantLabels(labels) => self.strip_invariant_labels(&item.key, &labels).await,
            Decision::RunWorkflow(stage) => self.dispatch_workflow(&item.key, stage, &item.status).await,
            Decision::IterateComment => {
                if let Some(stage) = Stage::from_status(&item.status) {
                    if let Err(e) = self.comment_reactor.react(&item.key, stage, &self.race_guard).await {
                        tracing::error!(repo = %item.key.repo, ticket_id = item.key.ticket_id, error = %e, "comment reactor failed");
                    }
                }
            }
            Decision::Advance(next_status) => {
                let _ = yolo::advance(self.adapter.as_ref(), self.store.as_ref(), &item.key, &next_status).await;
            }
        }
    }

    /// Whether the status currently on `item` was put there by an actor this
    /// daemon should not treat as a legitimate trigger (SPEC_FULL.md §7/§8):
    /// the daemon's own identity (self-trigger loop) or anyone outside the
    /// allowed actor. An unattributable status (`None`, e.g. GitHub's
    /// Projects-v2 audit trail isn't wired up) is permissive by default.
    async fn status_actor_blocked(&self, item: &Item) -> bool {
        match self.adapter.last_status_actor(&item.key.repo, item.key.ticket_id).await {
            Ok(Some(actor)) if actor == self.identity => {
                tracing::debug!(repo = %item.key.repo, ticket_id = item.key.ticket_id, "ignoring self-authored status transition");
                true
            }
            Ok(Some(actor)) if actor != self.allowed_username => {
                tracing::warn!(repo = %item.key.repo, ticket_id = item.key.ticket_id, actor, "status set by an actor outside the allowed set, ignoring");
                true
            }
            Ok(_) => false,
            Err(e) => {
                tracing::warn!(repo = %item.key.repo, ticket_id = item.key.ticket_id, error = %e, "failed to read status authorship, treating as unattributable");
                false
            }
        }
    }

    async fn dispatch_workflow(&self, item: &ItemKey, stage: Stage, status: &Status) {
        let running_label = stage.running_label();
        match self.race_guard.claim(&item.repo, item.ticket_id, running_label).await {
            Ok(ClaimOutcome::Claimed) => {
                self.runner_pool.try_dispatch(
                    item.clone(),
                    stage,
                    running_label,
                    self.identity.clone(),
                    status.as_str().to_string(),
                );
            }
            Ok(ClaimOutcome::RaceLost { .. }) => {}
            Err(e) => {
                tracing::error!(repo = %item.repo, ticket_id = item.ticket_id, error = %e, "failed to claim running label");
            }
        }
    }

    /// A running label with no locally-tracked run. Stripped only if this
    /// daemon's identity is still the last actor on it — otherwise another
    /// instance legitimately owns it (SPEC_FULL.md §4.6).
    async fn recover_stale_label(&self, item: &ItemKey, label: &str) {
        match self.adapter.last_label_actor(&item.repo, item.ticket_id, label).await {
            Ok(Some(actor)) if actor != self.identity => {}
            Ok(_) => {
                if let Err(e) = self.adapter.remove_label(&item.repo, item.ticket_id, label).await {
                    tracing::error!(repo = %item.repo, ticket_id = item.ticket_id, label, error = %e, "failed to recover stale running label");
                }
            }
            Err(e) => {
                tracing::error!(repo = %item.repo, ticket_id = item.ticket_id, label, error = %e, "failed to read label authorship during recovery");
            }
        }
    }

    /// Defensive repair for invariant 1 (§3): more than one running label on
    /// a single item can't arise from a correct claim. Strip all of them
    /// unconditionally, with no actor check — unlike `recover_stale_label`,
    /// this never defers to a competing instance.
    async fn strip_invariant_labels(&self, item: &ItemKey, labels: &[&'static str]) {
        tracing::error!(
            repo = %item.repo,
            ticket_id = item.ticket_id,
            labels = ?labels,
            "invariant violation: multiple running labels on one item, stripping all"
        );
        for &label in labels {
            if let Err(e) = self.adapter.remove_label(&item.repo, item.ticket_id, label).await {
                tracing::error!(repo = %item.repo, ticket_id = item.ticket_id, label, error = %e, "failed to strip invariant-violating label");
            }
        }
    }

    async fn cleanup(&self, item: &Item) {
        if item.has_label(CLEANUP_MARKER) {
            return;
        }
        if let Err(e) = self
            .adapter
            .add_label(&item.key.repo, item.key.ticket_id, CLEANUP_MARKER)
            .await
        {
            tracing::error!(repo = %item.key.repo, ticket_id = item.key.ticket_id, error = %e, "failed to mark item cleaned up");
        }
    }
}

#[cfg(test)]
#[path = "poller_tests.rs"]
mod tests;
