// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical label vocabulary and the stage/status mapping the rest of the
//! core is built on. Pure data, no I/O — see `decision` for the policy that
//! consumes it.

use serde::{Deserialize, Serialize};

/// One of the three substantive workflow stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Research,
    Plan,
    Implement,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Research, Stage::Plan, Stage::Implement];

    /// The running label set while this stage's workflow is in progress.
    pub fn running_label(self) -> &'static str {
        match self {
            Stage::Research => "researching",
            Stage::Plan => "planning",
            Stage::Implement => "implementing",
        }
    }

    /// The label set when the stage has produced output awaiting
    /// advancement. Implement has no ready label: it ends in a PR, not a
    /// label-gated handoff.
    pub fn ready_label(self) -> Option<&'static str> {
        match self {
            Stage::Research => Some("research_ready"),
            Stage::Plan => Some("plan_ready"),
            Stage::Implement => None,
        }
    }

    /// The label set when the stage's workflow fails. Plan has no label of
    /// its own in the canonical vocabulary (only `research_failed` and
    /// `implementation_failed` exist) — a failed Plan run is left without a
    /// failure label and simply re-triggers next cycle.
    pub fn failure_label(self) -> Option<&'static str> {
        match self {
            Stage::Research => Some("research_failed"),
            Stage::Plan => None,
            Stage::Implement => Some("implementation_failed"),
        }
    }

    pub fn from_status(status: &Status) -> Option<Stage> {
        match status {
            Status::Research => Some(Stage::Research),
            Status::Plan => Some(Stage::Plan),
            Status::Implement => Some(Stage::Implement),
            _ => None,
        }
    }

    /// The status an item moves to once this stage's ready label is
    /// consumed (by yolo or by a human advancing the board by hand).
    pub fn next_status(self) -> Status {
        match self {
            Stage::Research => Status::Plan,
            Stage::Plan => Status::Implement,
            Stage::Implement => Status::Review,
        }
    }
}

/// Board status column. `Unknown` is the passthrough case for columns the
/// daemon doesn't watch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Backlog,
    Research,
    Plan,
    Implement,
    Review,
    Done,
    Unknown(String),
}

impl Status {
    pub fn parse(raw: &str) -> Status {
        match raw {
            "Backlog" => Status::Backlog,
            "Research" => Status::Research,
            "Plan" => Status::Plan,
            "Implement" => Status::Implement,
            "Review" => Status::Review,
            "Done" => Status::Done,
            other => Status::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Status::Backlog => "Backlog",
            Status::Research => "Research",
            Status::Plan => "Plan",
            Status::Implement => "Implement",
            Status::Review => "Review",
            Status::Done => "Done",
            Status::Unknown(s) => s,
        }
    }
}

pub const RUNNING_LABELS: [&str; 6] = [
    "preparing",
    "researching",
    "planning",
    "implementing",
    "reviewing",
    "editing",
];

pub const READY_LABELS: [&str; 2] = ["research_ready", "plan_ready"];

pub const CONTROL_LABELS: [&str; 2] = ["yolo", "reset"];

pub const FAILURE_LABELS: [&str; 3] = ["yolo_failed", "implementation_failed", "research_failed"];

pub const MARKER_LABELS: [&str; 1] = ["cleaned_up"];

/// All labels this daemon ever applies or removes — used by `ResetController`
/// to strip everything it is responsible for without touching unrelated
/// labels a human added.
pub fn all_kiln_labels() -> impl Iterator<Item = &'static str> {
    RUNNING_LABELS
        .iter()
        .chain(READY_LABELS.iter())
        .chain(CONTROL_LABELS.iter())
        .chain(FAILURE_LABELS.iter())
        .chain(MARKER_LABELS.iter())
        .copied()
}

/// Pure queries over the canonical label vocabulary. Holds no state.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelModel;

impl LabelModel {
    pub fn running_label(&self, status: &Status) -> Option<&'static str> {
        Stage::from_status(status).map(Stage::running_label)
    }

    pub fn ready_label(&self, status: &Status) -> Option<&'static str> {
        Stage::from_status(status).and_then(Stage::ready_label)
    }

    pub fn failure_label(&self, status: &Status) -> Option<&'static str> {
        Stage::from_status(status).and_then(Stage::failure_label)
    }

    pub fn is_running(&self, label: &str) -> bool {
        RUNNING_LABELS.contains(&label)
    }

    pub fn is_ready(&self, label: &str) -> bool {
        READY_LABELS.contains(&label)
    }

    /// The running label(s) present on a ticket's label set, if any. More
    /// than one element here is itself an `InvariantViolation` (§8 invariant 1).
    pub fn running_labels_present<'a>(&self, labels: &'a [String]) -> Vec<&'a str> {
        labels
            .iter()
            .map(String::as_str)
            .filter(|l| self.is_running(l))
            .collect()
    }
}

#[cfg(test)]
#[path = "label_tests.rs"]
mod tests;
