// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-poll snapshot of a ticket and the keys derived from it.

use crate::label::Status;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a ticket independent of any particular poll: `(repo, ticket_id)`.
/// This is the key RunRecords, Store rows and the RaceGuard all index by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    pub repo: String,
    pub ticket_id: u64,
}

impl ItemKey {
    pub fn new(repo: impl Into<String>, ticket_id: u64) -> Self {
        Self {
            repo: repo.into(),
            ticket_id,
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.repo, self.ticket_id)
    }
}

/// One ticket/issue snapshot from a poll. Never persisted between cycles
/// except as a Store summary — the ticket platform is the source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub key: ItemKey,
    pub status: Status,
    pub labels: Vec<String>,
    pub title: String,
    pub open: bool,
    pub comment_count: u32,
    /// True when a linked change (PR) targeting this item has been merged.
    pub merged: bool,
}

impl Item {
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// `(repo, ticket_id, running_label)` — uniquely identifies one in-flight
/// workflow. Two RunKeys may share a repo/ticket_id only transiently across
/// a release-then-claim boundary; the RunnerPool enforces the "at most one
/// active key per (repo, ticket_id)" invariant, not this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunKey {
    pub item: ItemKey,
    pub running_label: String,
}

impl RunKey {
    pub fn new(item: ItemKey, running_label: impl Into<String>) -> Self {
        Self {
            item,
            running_label: running_label.into(),
        }
    }
}

#[cfg(test)]
#[path = "item_tests.rs"]
mod tests;
