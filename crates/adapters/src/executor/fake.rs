// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic WorkflowExecutor for tests: returns scripted outcomes
//! without spawning anything, and records every call for assertions.

use super::{ExecutorError, WorkflowExecutor};
use async_trait::async_trait;
use kiln_core::{ItemKey, RunOutcome, Stage};
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorCall {
    pub stage: Stage,
    pub item: ItemKey,
    pub claimer: String,
}

struct FakeState {
    scripted: VecDeque<Result<RunOutcome, String>>,
    calls: Vec<ExecutorCall>,
}

/// Outcomes are consumed in FIFO order; once exhausted, every further call
/// returns a default success so tests don't need to script every run.
#[derive(Clone)]
pub struct FakeWorkflowExecutor {
    state: std::sync::Arc<Mutex<FakeState>>,
}

impl FakeWorkflowExecutor {
    pub fn new() -> Self {
        Self {
            state: std::sync::Arc::new(Mutex::new(FakeState {
                scripted: VecDeque::new(),
                calls: Vec::new(),
            })),
        }
    }

    pub fn push_success(&self, session_ref: impl Into<String>) {
        self.state.lock().scripted.push_back(Ok(RunOutcome::Success {
            session_ref: Some(session_ref.into()),
        }));
    }

    pub fn push_failure(&self, reason: impl Into<String>) {
        self.state
            .lock()
            .scripted
            .push_back(Ok(RunOutcome::Failure { reason: reason.into() }));
    }

    pub fn push_cancelled(&self) {
        self.state.lock().scripted.push_back(Ok(RunOutcome::Cancelled));
    }

    pub fn push_launch_error(&self, message: impl Into<String>) {
        self.state.lock().scripted.push_back(Err(message.into()));
    }

    pub fn calls(&self) -> Vec<ExecutorCall> {
        self.state.lock().calls.clone()
    }
}

impl Default for FakeWorkflowExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkflowExecutor for FakeWorkflowExecutor {
    async fn run(
        &self,
        stage: Stage,
        item: &ItemKey,
        claimer: &str,
        cancel: CancellationToken,
    ) -> Result<RunOutcome, ExecutorError> {
        if cancel.is_cancelled() {
            return Ok(RunOutcome::Cancelled);
        }
        let mut state = self.state.lock();
        state.calls.push(ExecutorCall {
            stage,
            item: item.clone(),
            claimer: claimer.to_string(),
        });
        match state.scripted.pop_front() {
            Some(Ok(outcome)) => Ok(outcome),
            Some(Err(message)) => Err(ExecutorError::Launch(message)),
            None => Ok(RunOutcome::Success {
                session_ref: Some(format!("{item}@{stage:?}")),
            }),
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
