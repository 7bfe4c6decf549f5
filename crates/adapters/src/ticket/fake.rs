// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic in-memory TicketAdapter for tests, modeled on the teacher's
//! `FakeAgentAdapter` / `FakeSessionAdapter` call-log pattern: every method
//! records a `TicketCall` so tests can assert on what the core asked for, in
//! addition to driving the returned state.

use super::{Board, PullRequestRef, TicketAdapter};
use async_trait::async_trait;
use kiln_core::{AdapterError, Comment, Item, ItemKey, ReactionKind};
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum TicketCall {
    ListItems { repo: String },
    AddLabel { repo: String, ticket_id: u64, label: String },
    RemoveLabel { repo: String, ticket_id: u64, label: String },
    SetStatus { repo: String, ticket_id: u64, status: String },
    UpdateBody { repo: String, ticket_id: u64 },
    AddComment { repo: String, ticket_id: u64 },
    SetReaction { comment_id: String },
    ClosePullRequest { repo: String, number: u64 },
    DeleteBranch { repo: String, name: String },
}

struct FakeState {
    items: HashMap<String, Vec<Item>>, // keyed by board repo
    bodies: HashMap<ItemKey, String>,
    comments: HashMap<ItemKey, Vec<Comment>>,
    last_label_actor: HashMap<(ItemKey, String), String>,
    last_status_actor: HashMap<ItemKey, String>,
    pull_requests: HashMap<ItemKey, Vec<PullRequestRef>>,
    calls: Vec<TicketCall>,
    /// Identity the fake stamps onto every write, simulating "this daemon's
    /// own actor" unless overridden per-item via `set_label_actor_override`.
    actor: String,
    fail_next_set_status: Option<String>,
    fail_next_list_items: Option<AdapterError>,
}

/// Test-only fake: `Arc`-shared, cheap to clone, behind the `test-support`
/// feature exactly as the teacher gates its fakes.
#[derive(Clone)]
pub struct FakeTicketAdapter {
    state: std::sync::Arc<Mutex<FakeState>>,
}

impl FakeTicketAdapter {
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            state: std::sync::Arc::new(Mutex::new(FakeState {
                items: HashMap::new(),
                bodies: HashMap::new(),
                comments: HashMap::new(),
                last_label_actor: HashMap::new(),
                last_status_actor: HashMap::new(),
                pull_requests: HashMap::new(),
                calls: Vec::new(),
                actor: actor.into(),
                fail_next_set_status: None,
                fail_next_list_items: None,
            })),
        }
    }

    /// Makes the next `set_status` call return `AdapterError::Transient`
    /// instead of succeeding, simulating a platform write failure.
    pub fn fail_next_set_status(&self, reason: impl Into<String>) {
        self.state.lock().fail_next_set_status = Some(reason.into());
    }

    /// Makes the next `list_items` call return `error` instead of succeeding,
    /// simulating an unreachable or misbehaving platform.
    pub fn fail_next_list_items(&self, error: AdapterError) {
        self.state.lock().fail_next_list_items = Some(error);
    }

    pub fn seed_items(&self, repo: &str, items: Vec<Item>) {
        self.state.lock().items.insert(repo.to_string(), items);
    }

    pub fn seed_body(&self, item: ItemKey, body: impl Into<String>) {
        self.state.lock().bodies.insert(item, body.into());
    }

    pub fn seed_comments(&self, item: ItemKey, comments: Vec<Comment>) {
        self.state.lock().comments.insert(item, comments);
    }

    pub fn seed_pull_requests(&self, item: ItemKey, prs: Vec<PullRequestRef>) {
        self.state.lock().pull_requests.insert(item, prs);
    }

    /// Force the authorship an upcoming `add_label` on this (item, label)
    /// will be observed to have, simulating a race against another actor.
    pub fn force_label_actor(&self, item: ItemKey, label: impl Into<String>, actor: impl Into<String>) {
        self.state
            .lock()
            .last_label_actor
            .insert((item, label.into()), actor.into());
    }

    pub fn calls(&self) -> Vec<TicketCall> {
        self.state.lock().calls.clone()
    }

    pub fn labels_of(&self, item: &ItemKey) -> Vec<String> {
        let state = self.state.lock();
        state
            .items
            .get(&item.repo)
            .and_then(|items| items.iter().find(|i| i.key == *item))
            .map(|i| i.labels.clone())
            .unwrap_or_default()
    }

    pub fn status_of(&self, item: &ItemKey) -> Option<kiln_core::Status> {
        let state = self.state.lock();
        state
            .items
            .get(&item.repo)
            .and_then(|items| items.iter().find(|i| i.key == *item))
            .map(|i| i.status.clone())
    }
}

#[async_trait]
impl TicketAdapter for FakeTicketAdapter {
    async fn list_items(&self, board: &Board) -> Result<Vec<Item>, AdapterError> {
        let mut state = self.state.lock();
        if let Some(e) = state.fail_next_list_items.take() {
            return Err(e);
        }
        state.calls.push(TicketCall::ListItems {
            repo: board.repo.clone(),
        });
        Ok(state.items.get(&board.repo).cloned().unwrap_or_default())
    }

    async fn get_body(&self, repo: &str, ticket_id: u64) -> Result<String, AdapterError> {
        let state = self.state.lock();
        Ok(state
            .bodies
            .get(&ItemKey::new(repo, ticket_id))
            .cloned()
            .unwrap_or_default())
    }

    async fn update_body(&self, repo: &str, ticket_id: u64, new_body: &str) -> Result<(), AdapterError> {
        let mut state = self.state.lock();
        state.calls.push(TicketCall::UpdateBody {
            repo: repo.to_string(),
            ticket_id,
        });
        state
            .bodies
            .insert(ItemKey::new(repo, ticket_id), new_body.to_string());
        Ok(())
    }

    async fn add_label(&self, repo: &str, ticket_id: u64, label: &str) -> Result<(), AdapterError> {
        let mut state = self.state.lock();
        state.calls.push(TicketCall::AddLabel {
            repo: repo.to_string(),
            ticket_id,
            label: label.to_string(),
        });
        let key = ItemKey::new(repo, ticket_id);
        let actor = state.actor.clone();
        state
            .last_label_actor
            .entry((key.clone(), label.to_string()))
            .or_insert(actor);
        if let Some(items) = state.items.get_mut(repo) {
            if let Some(item) = items.iter_mut().find(|i| i.key == key) {
                if !item.labels.iter().any(|l| l == label) {
                    item.labels.push(label.to_string());
                }
            }
        }
        Ok(())
    }

    async fn remove_label(&self, repo: &str, ticket_id: u64, label: &str) -> Result<(), AdapterError> {
        let mut state = self.state.lock();
        state.calls.push(TicketCall::RemoveLabel {
            repo: repo.to_string(),
            ticket_id,
            label: label.to_string(),
        });
        let key = ItemKey::new(repo, ticket_id);
        state.last_label_actor.remove(&(key.clone(), label.to_string()));
        if let Some(items) = state.items.get_mut(repo) {
            if let Some(item) = items.iter_mut().find(|i| i.key == key) {
                item.labels.retain(|l| l != label);
            }
        }
        Ok(())
    }

    async fn list_labels(&self, _repo: &str) -> Result<Vec<String>, AdapterError> {
        Ok(kiln_core::label::all_kiln_labels().map(str::to_string).collect())
    }

    async fn create_label(
        &self,
        _repo: &str,
        _name: &str,
        _description: &str,
        _color: &str,
    ) -> Result<bool, AdapterError> {
        Ok(true)
    }

    async fn set_status(&self, repo: &str, ticket_id: u64, status: &str) -> Result<(), AdapterError> {
        let mut state = self.state.lock();
        if let Some(reason) = state.fail_next_set_status.take() {
            return Err(AdapterError::Transient(reason));
        }
        state.calls.push(TicketCall::SetStatus {
            repo: repo.to_string(),
            ticket_id,
            status: status.to_string(),
        });
        let key = ItemKey::new(repo, ticket_id);
        let actor = state.actor.clone();
        state.last_status_actor.insert(key.clone(), actor);
        if let Some(items) = state.items.get_mut(repo) {
            if let Some(item) = items.iter_mut().find(|i| i.key == key) {
                item.status = kiln_core::Status::parse(status);
            }
        }
        Ok(())
    }

    async fn archive(&self, _board: &Board, _ticket_id: u64) -> Result<bool, AdapterError> {
        Ok(true)
    }

    async fn list_comments_since(
        &self,
        repo: &str,
        ticket_id: u64,
        since: Option<&str>,
    ) -> Result<Vec<Comment>, AdapterError> {
        let state = self.state.lock();
        let all = state
            .comments
            .get(&ItemKey::new(repo, ticket_id))
            .cloned()
            .unwrap_or_default();
        Ok(match since {
            None => all,
            Some(since) => all
                .into_iter()
                .filter(|c| c.created_at.as_str() > since)
                .collect(),
        })
    }

    async fn add_comment(&self, repo: &str, ticket_id: u64, body: &str) -> Result<Comment, AdapterError> {
        let mut state = self.state.lock();
        state.calls.push(TicketCall::AddComment {
            repo: repo.to_string(),
            ticket_id,
        });
        let actor = state.actor.clone();
        let comment = Comment {
            id: format!("c{}", state.calls.len()),
            author: actor,
            created_at: format!("2026-01-01T00:00:{:02}Z", state.calls.len() % 60),
            body: body.to_string(),
        };
        state
            .comments
            .entry(ItemKey::new(repo, ticket_id))
            .or_default()
            .push(comment.clone());
        Ok(comment)
    }

    async fn set_reaction(&self, comment_id: &str, _kind: ReactionKind) -> Result<(), AdapterError> {
        self.state.lock().calls.push(TicketCall::SetReaction {
            comment_id: comment_id.to_string(),
        });
        Ok(())
    }

    async fn last_status_actor(&self, repo: &str, ticket_id: u64) -> Result<Option<String>, AdapterError> {
        Ok(self
            .state
            .lock()
            .last_status_actor
            .get(&ItemKey::new(repo, ticket_id))
            .cloned())
    }

    async fn last_label_actor(
        &self,
        repo: &str,
        ticket_id: u64,
        label: &str,
    ) -> Result<Option<String>, AdapterError> {
        Ok(self
            .state
            .lock()
            .last_label_actor
            .get(&(ItemKey::new(repo, ticket_id), label.to_string()))
            .cloned())
    }

    async fn linked_pull_requests(&self, repo: &str, ticket_id: u64) -> Result<Vec<PullRequestRef>, AdapterError> {
        Ok(self
            .state
            .lock()
            .pull_requests
            .get(&ItemKey::new(repo, ticket_id))
            .cloned()
            .unwrap_or_default())
    }

    async fn close_pull_request(&self, repo: &str, number: u64) -> Result<(), AdapterError> {
        self.state.lock().calls.push(TicketCall::ClosePullRequest {
            repo: repo.to_string(),
            number,
        });
        Ok(())
    }

    async fn delete_branch(&self, repo: &str, name: &str) -> Result<(), AdapterError> {
        self.state.lock().calls.push(TicketCall::DeleteBranch {
            repo: repo.to_string(),
            name: name.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
