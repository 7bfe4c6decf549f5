// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runs a workflow stage as an external agent CLI subprocess, the same way
//! the teacher's subprocess helpers wrap `Command::output()` in a timeout.

use super::{ExecutorError, WorkflowExecutor};
use async_trait::async_trait;
use kiln_core::{ItemKey, RunOutcome, Stage};
use std::time::Duration;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Safety-net ceiling for a single workflow invocation.
pub const WORKFLOW_TIMEOUT: Duration = Duration::from_secs(60 * 60 * 4);

pub struct ProcessWorkflowExecutor {
    /// Path to the agent CLI binary, e.g. `claude`.
    binary: String,
    /// Working directory each invocation is spawned in (the checked-out
    /// repo worktree).
    workdir: std::path::PathBuf,
}

impl ProcessWorkflowExecutor {
    pub fn new(binary: impl Into<String>, workdir: impl Into<std::path::PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            workdir: workdir.into(),
        }
    }

    fn stage_prompt_flag(stage: Stage) -> &'static str {
        match stage {
            Stage::Research => "--research",
            Stage::Plan => "--plan",
            Stage::Implement => "--implement",
        }
    }
}

#[async_trait]
impl WorkflowExecutor for ProcessWorkflowExecutor {
    async fn run(
        &self,
        stage: Stage,
        item: &ItemKey,
        claimer: &str,
        cancel: CancellationToken,
    ) -> Result<RunOutcome, ExecutorError> {
        let mut cmd = Command::new(&self.binary);
        cmd.current_dir(&self.workdir)
            .arg(Self::stage_prompt_flag(stage))
            .arg("--repo")
            .arg(&item.repo)
            .arg("--ticket")
            .arg(item.ticket_id.to_string())
            .arg("--claimer")
            .arg(claimer);

        let output = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(RunOutcome::Cancelled),
            result = tokio::time::timeout(WORKFLOW_TIMEOUT, cmd.output()) => result,
        };

        match output {
            Ok(Ok(output)) if output.status.success() => Ok(RunOutcome::Success {
                session_ref: Some(format!("{item}@{stage:?}")),
            }),
            Ok(Ok(output)) => Ok(RunOutcome::Failure {
                reason: format!("exited with {}", output.status),
            }),
            Ok(Err(io_err)) => Err(ExecutorError::Launch(io_err.to_string())),
            Err(_elapsed) => Err(ExecutorError::Timeout(WORKFLOW_TIMEOUT)),
        }
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
