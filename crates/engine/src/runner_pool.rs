// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded concurrent workflow execution and lifecycle tracking
//! (SPEC_FULL.md §4.5). The RunRecord map is an efficiency index, never the
//! source of truth — the remote labels are (SPEC_FULL.md §9).

use crate::effects;
use kiln_adapters::{TicketAdapter, WorkflowExecutor};
use kiln_core::{Clock, Effect, ItemKey, RunOutcome, RunRecord, Stage};
use kiln_storage::Store;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

struct ActiveRun {
    record: RunRecord,
    cancel: CancellationToken,
}

/// Bounded pool of in-flight workflows, keyed by `(repo, ticket_id)`. At
/// most one `RunRecord` per key; at most `max_concurrent` total.
pub struct RunnerPool {
    max_concurrent: usize,
    adapter: Arc<dyn TicketAdapter>,
    store: Arc<dyn Store>,
    executor: Arc<dyn WorkflowExecutor>,
    clock: Arc<dyn Clock>,
    active: Arc<Mutex<HashMap<ItemKey, ActiveRun>>>,
    handles: Mutex<Vec<tokio::task::JoinHandle<()>>>,
}

impl RunnerPool {
    pub fn new(
        max_concurrent: usize,
        adapter: Arc<dyn TicketAdapter>,
        store: Arc<dyn Store>,
        executor: Arc<dyn WorkflowExecutor>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            max_concurrent,
            adapter,
            store,
            executor,
            clock,
            active: Arc::new(Mutex::new(HashMap::new())),
            handles: Mutex::new(Vec::new()),
        }
    }

    pub fn active_count(&self) -> usize {
        self.active.lock().len()
    }

    pub fn has_active_run(&self, item: &ItemKey) -> bool {
        self.active.lock().contains_key(item)
    }

    /// Attempt to dispatch `stage` for `item`, already claimed under
    /// `running_label` by the caller's `RaceGuard`. Returns `false` without
    /// spawning anything if the item already has a local run or the pool is
    /// at capacity (SPEC_FULL.md §4.5 contract).
    pub fn try_dispatch(
        &self,
        item: ItemKey,
        stage: Stage,
        running_label: &str,
        claimer: String,
        status_at_dispatch: String,
    ) -> bool {
        let mut active = self.active.lock();
        if active.contains_key(&item) {
            return false;
        }
        if active.len() >= self.max_concurrent {
            return false;
        }

        let cancel = CancellationToken::new();
        let started_at_ms = self.clock.epoch_ms();
        let record = RunRecord::new(
            kiln_core::RunKey::new(item.clone(), running_label),
            stage,
            started_at_ms,
            status_at_dispatch,
            claimer.clone(),
        );
        active.insert(
            item.clone(),
            ActiveRun {
                record: record.clone(),
                cancel: cancel.clone(),
            },
        );
        drop(active);

        let adapter = Arc::clone(&self.adapter);
        let store = Arc::clone(&self.store);
        let executor = Arc::clone(&self.executor);
        let clock = Arc::clone(&self.clock);
        let active_map = Arc::clone(&self.active);
        let running_label = running_label.to_string();
        let span = tracing::info_span!("workflow", repo = %item.repo, ticket_id = item.ticket_id, stage = ?stage);

        let handle = tokio::spawn(
            async move {
                let outcome = executor
                    .run(stage, &item, &claimer, cancel)
                    .await
                    .unwrap_or_else(|e| {
                        tracing::error!(error = %e, "workflow executor failed to launch");
                        RunOutcome::Failure { reason: e.to_string() }
                    });

                let finished_at_ms = clock.epoch_ms();
                let effects = terminal_effects(&item, stage, &running_label, &outcome, started_at_ms, finished_at_ms);
                if let Err(e) = effects::apply_effects(adapter.as_ref(), store.as_ref(), &effects).await {
                    tracing::error!(error = %e, "failed to apply termination effects");
                }

                active_map.lock().remove(&item);
            }
            .instrument(span),
        );
        let mut handles = self.handles.lock();
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
        drop(handles);

        true
    }

    /// Cancel every run older than `threshold_ms` as of `now_ms`. The next
    /// poll cycle's TriggerPolicy rule 3 sweeps the now-dangling labels once
    /// the task actually exits.
    pub fn sweep_stale(&self, now_ms: u64, threshold_ms: u64) -> Vec<ItemKey> {
        let active = self.active.lock();
        let mut signalled = Vec::new();
        for (item, run) in active.iter() {
            if run.record.is_stale(now_ms, threshold_ms) {
                run.cancel.cancel();
                signalled.push(item.clone());
            }
        }
        signalled
    }

    /// Cancel every active run (shutdown path, SPEC_FULL.md §5).
    pub fn cancel_all(&self) {
        for run in self.active.lock().values() {
            run.cancel.cancel();
        }
    }

    /// Wait for every dispatched workflow to exit. Shutdown is bounded only
    /// by the longest-running workflow's cooperation with its cancellation
    /// token (SPEC_FULL.md §5) — this has no timeout of its own.
    pub async fn drain(&self) {
        let handles: Vec<_> = self.handles.lock().drain(..).collect();
        for handle in handles {
            if let Err(e) = handle.await {
                if e.is_panic() {
                    tracing::error!("workflow task panicked during shutdown drain");
                }
            }
        }
    }
}

fn terminal_effects(
    item: &ItemKey,
    stage: Stage,
    running_label: &str,
    outcome: &RunOutcome,
    started_at_ms: u64,
    finished_at_ms: u64,
) -> Vec<Effect> {
    let mut effects = vec![Effect::RemoveLabel {
        item: item.clone(),
        label: running_label.to_string(),
    }];

    let (outcome_name, session_ref) = match outcome {
        RunOutcome::Success { session_ref } => {
            if let Some(ready) = stage.ready_label() {
                effects.push(Effect::AddLabel {
                    item: item.clone(),
                    label: ready.to_string(),
                });
            }
            ("success", session_ref.clone())
        }
        RunOutcome::Failure { .. } => {
            if let Some(failure) = stage.failure_label() {
                effects.push(Effect::AddLabel {
                    item: item.clone(),
                    label: failure.to_string(),
                });
            }
            ("failure", None)
        }
        RunOutcome::Cancelled => ("cancelled", None),
    };

    effects.push(Effect::RecordRunHistory {
        item: item.clone(),
        workflow: format!("{stage:?}").to_lowercase(),
        started_at_ms,
        finished_at_ms,
        outcome: outcome_name.to_string(),
        session_ref,
    });

    effects
}

#[cfg(test)]
#[path = "runner_pool_tests.rs"]
mod tests;
