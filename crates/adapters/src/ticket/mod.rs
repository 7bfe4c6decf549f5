// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TicketAdapter: the capability the core depends on to read and write the
//! board. See SPEC_FULL.md §6 for the full method list and contract.

mod github;

#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use github::GitHubTicketAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeTicketAdapter, TicketCall};

use async_trait::async_trait;
use kiln_core::{AdapterError, Comment, Item, ReactionKind};
use serde::{Deserialize, Serialize};

/// One board configured for polling: a repo plus the project view on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    pub repo: String,
    pub project: String,
}

/// A pull request linked to an item, as needed by ResetController (§4.9).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef {
    pub number: u64,
    pub branch: String,
}

/// The interface the core consumes to read and mutate board state. Modeled
/// as a capability trait per SPEC_FULL.md §9 ("dynamic dispatch on ticket
/// providers") — the core depends only on this, never on a concrete
/// provider type.
#[async_trait]
pub trait TicketAdapter: Send + Sync + 'static {
    async fn list_items(&self, board: &Board) -> Result<Vec<Item>, AdapterError>;
    async fn get_body(&self, repo: &str, ticket_id: u64) -> Result<String, AdapterError>;
    async fn update_body(&self, repo: &str, ticket_id: u64, new_body: &str) -> Result<(), AdapterError>;
    /// Idempotent: adding a label already present is a no-op at the adapter
    /// layer, never an error.
    async fn add_label(&self, repo: &str, ticket_id: u64, label: &str) -> Result<(), AdapterError>;
    async fn remove_label(&self, repo: &str, ticket_id: u64, label: &str) -> Result<(), AdapterError>;
    async fn list_labels(&self, repo: &str) -> Result<Vec<String>, AdapterError>;
    async fn create_label(
        &self,
        repo: &str,
        name: &str,
        description: &str,
        color: &str,
    ) -> Result<bool, AdapterError>;
    async fn set_status(&self, repo: &str, ticket_id: u64, status: &str) -> Result<(), AdapterError>;
    async fn archive(&self, board: &Board, ticket_id: u64) -> Result<bool, AdapterError>;
    /// Comments strictly newer than `since` (ISO-8601), or all comments if
    /// `since` is `None`. Pagination is the adapter's responsibility.
    async fn list_comments_since(
        &self,
        repo: &str,
        ticket_id: u64,
        since: Option<&str>,
    ) -> Result<Vec<Comment>, AdapterError>;
    async fn add_comment(&self, repo: &str, ticket_id: u64, body: &str) -> Result<Comment, AdapterError>;
    async fn set_reaction(&self, comment_id: &str, kind: ReactionKind) -> Result<(), AdapterError>;
    async fn last_status_actor(&self, repo: &str, ticket_id: u64) -> Result<Option<String>, AdapterError>;
    /// The actor who authored the most recent add of `label` — the
    /// authorship re-read RaceGuard's claim protocol depends on (§4.4).
    async fn last_label_actor(
        &self,
        repo: &str,
        ticket_id: u64,
        label: &str,
    ) -> Result<Option<String>, AdapterError>;
    async fn linked_pull_requests(&self, repo: &str, ticket_id: u64) -> Result<Vec<PullRequestRef>, AdapterError>;
    async fn close_pull_request(&self, repo: &str, number: u64) -> Result<(), AdapterError>;
    async fn delete_branch(&self, repo: &str, name: &str) -> Result<(), AdapterError>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
