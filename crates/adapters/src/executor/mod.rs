// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WorkflowExecutor: the capability the core depends on to actually run a
//! Research/Plan/Implement workflow for a claimed item. See SPEC_FULL.md §6.

mod process;

#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use process::ProcessWorkflowExecutor;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeWorkflowExecutor, ExecutorCall};

use async_trait::async_trait;
use kiln_core::{ItemKey, RunOutcome, Stage};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Launch-time failure: anything short of a terminal outcome. A cooperative
/// cancellation is itself a `RunOutcome::Cancelled`, not an `ExecutorError` —
/// only a workflow that never got to run at all is an error here.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("workflow launch failed: {0}")]
    Launch(String),
    #[error("workflow timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// The interface the core consumes to run a workflow stage against a claimed
/// item. A capability trait for the same reason TicketAdapter is one: the
/// core never depends on a concrete agent runner. Returns the same
/// `RunOutcome` the RunnerPool already uses to close out a `RunRecord`.
#[async_trait]
pub trait WorkflowExecutor: Send + Sync + 'static {
    /// Runs `stage` against `item`, cooperatively honoring `cancel` (e.g. a
    /// race loss discovered mid-run). Implementations must treat
    /// cancellation as best-effort: a workflow that has already produced
    /// irreversible side effects (a pushed commit) may still return
    /// `RunOutcome::Success` after the token fires.
    async fn run(
        &self,
        stage: Stage,
        item: &ItemKey,
        claimer: &str,
        cancel: CancellationToken,
    ) -> Result<RunOutcome, ExecutorError>;
}
