// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Best-effort GitHub/GHES REST client. This is the one external
//! collaborator SPEC_FULL.md names as out of scope that still gets a real
//! (not merely faked) implementation, since some board has to exist; it is
//! deliberately thin next to the `FakeTicketAdapter` the test suite actually
//! exercises.

use super::{Board, PullRequestRef, TicketAdapter};
use async_trait::async_trait;
use kiln_core::{AdapterError, Comment, Item, ItemKey, ReactionKind, Status};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

pub struct GitHubTicketAdapter {
    client: Client,
    base_url: String,
    token: String,
}

impl GitHubTicketAdapter {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "kiln")
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, AdapterError> {
        let resp = req.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                AdapterError::PlatformUnreachable(e.to_string())
            } else {
                AdapterError::Transient(e.to_string())
            }
        })?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }
        Ok(resp)
    }
}

/// Maps an HTTP status to the core's error taxonomy (SPEC_FULL.md §8).
fn classify_status(status: StatusCode, body: &str) -> AdapterError {
    match status.as_u16() {
        401 | 403 => AdapterError::Authorization(format!("{status}: {body}")),
        429 | 502 | 503 => AdapterError::Transient(format!("{status}: {body}")),
        500..=599 => AdapterError::PlatformUnreachable(format!("{status}: {body}")),
        _ => AdapterError::Schema(format!("{status}: {body}")),
    }
}

#[derive(Debug, Deserialize)]
struct GhLabel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GhIssue {
    number: u64,
    title: String,
    state: String,
    labels: Vec<GhLabel>,
    comments: u32,
    body: Option<String>,
}

#[async_trait]
impl TicketAdapter for GitHubTicketAdapter {
    async fn list_items(&self, board: &Board) -> Result<Vec<Item>, AdapterError> {
        let path = format!("/repos/{}/issues?state=open&per_page=100", board.repo);
        let resp = self.send(self.request(reqwest::Method::GET, &path)).await?;
        let issues: Vec<GhIssue> = resp
            .json()
            .await
            .map_err(|e| AdapterError::Schema(e.to_string()))?;

        Ok(issues
            .into_iter()
            .map(|issue| Item {
                key: ItemKey::new(board.repo.clone(), issue.number),
                status: Status::parse(project_status_placeholder(&issue.state)),
                labels: issue.labels.into_iter().map(|l| l.name).collect(),
                title: issue.title,
                open: issue.state == "open",
                comment_count: issue.comments,
                merged: false,
            })
            .collect())
    }

    async fn get_body(&self, repo: &str, ticket_id: u64) -> Result<String, AdapterError> {
        let path = format!("/repos/{repo}/issues/{ticket_id}");
        let resp = self.send(self.request(reqwest::Method::GET, &path)).await?;
        let issue: GhIssue = resp
            .json()
            .await
            .map_err(|e| AdapterError::Schema(e.to_string()))?;
        Ok(issue.body.unwrap_or_default())
    }

    async fn update_body(&self, repo: &str, ticket_id: u64, new_body: &str) -> Result<(), AdapterError> {
        let path = format!("/repos/{repo}/issues/{ticket_id}");
        let req = self
            .request(reqwest::Method::PATCH, &path)
            .json(&json!({ "body": new_body }));
        self.send(req).await?;
        Ok(())
    }

    async fn add_label(&self, repo: &str, ticket_id: u64, label: &str) -> Result<(), AdapterError> {
        let path = format!("/repos/{repo}/issues/{ticket_id}/labels");
        let req = self
            .request(reqwest::Method::POST, &path)
            .json(&json!({ "labels": [label] }));
        self.send(req).await?;
        Ok(())
    }

    async fn remove_label(&self, repo: &str, ticket_id: u64, label: &str) -> Result<(), AdapterError> {
        let path = format!("/repos/{repo}/issues/{ticket_id}/labels/{label}");
        match self.send(self.request(reqwest::Method::DELETE, &path)).await {
            Ok(_) => Ok(()),
            // Idempotent: removing an absent label is not an error.
            Err(AdapterError::Schema(msg)) if msg.contains("404") => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn list_labels(&self, repo: &str) -> Result<Vec<String>, AdapterError> {
        let path = format!("/repos/{repo}/labels?per_page=100");
        let resp = self.send(self.request(reqwest::Method::GET, &path)).await?;
        let labels: Vec<GhLabel> = resp
            .json()
            .await
            .map_err(|e| AdapterError::Schema(e.to_string()))?;
        Ok(labels.into_iter().map(|l| l.name).collect())
    }

    async fn create_label(
        &self,
        repo: &str,
        name: &str,
        description: &str,
        color: &str,
    ) -> Result<bool, AdapterError> {
        let path = format!("/repos/{repo}/labels");
        let req = self.request(reqwest::Method::POST, &path).json(&json!({
            "name": name,
            "description": description,
            "color": color,
        }));
        match self.send(req).await {
            Ok(_) => Ok(true),
            Err(AdapterError::Schema(msg)) if msg.contains("422") => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn set_status(&self, _repo: &str, _ticket_id: u64, _status: &str) -> Result<(), AdapterError> {
        // Status lives on the project board (GraphQL projectsV2), not the
        // issues REST endpoint; left unimplemented for the best-effort
        // adapter, see DESIGN.md.
        Err(AdapterError::Schema(
            "set_status requires the GraphQL projects API, not implemented".to_string(),
        ))
    }

    async fn archive(&self, _board: &Board, _ticket_id: u64) -> Result<bool, AdapterError> {
        Err(AdapterError::Schema(
            "archive requires the GraphQL projects API, not implemented".to_string(),
        ))
    }

    async fn list_comments_since(
        &self,
        repo: &str,
        ticket_id: u64,
        since: Option<&str>,
    ) -> Result<Vec<Comment>, AdapterError> {
        let mut path = format!("/repos/{repo}/issues/{ticket_id}/comments?per_page=100");
        if let Some(since) = since {
            path.push_str(&format!("&since={since}"));
        }
        #[derive(Deserialize)]
        struct GhComment {
            id: u64,
            body: String,
            created_at: String,
            user: GhUser,
        }
        #[derive(Deserialize)]
        struct GhUser {
            login: String,
        }
        let resp = self.send(self.request(reqwest::Method::GET, &path)).await?;
        let comments: Vec<GhComment> = resp
            .json()
            .await
            .map_err(|e| AdapterError::Schema(e.to_string()))?;
        Ok(comments
            .into_iter()
            .map(|c| Comment {
                id: c.id.to_string(),
                author: c.user.login,
                created_at: c.created_at,
                body: c.body,
            })
            .collect())
    }

    async fn add_comment(&self, repo: &str, ticket_id: u64, body: &str) -> Result<Comment, AdapterError> {
        let path = format!("/repos/{repo}/issues/{ticket_id}/comments");
        let req = self
            .request(reqwest::Method::POST, &path)
            .json(&json!({ "body": body }));
        let resp = self.send(req).await?;
        #[derive(Deserialize)]
        struct GhComment {
            id: u64,
            created_at: String,
        }
        let c: GhComment = resp.json().await.map_err(|e| AdapterError::Schema(e.to_string()))?;
        Ok(Comment {
            id: c.id.to_string(),
            author: String::new(),
            created_at: c.created_at,
            body: body.to_string(),
        })
    }

    async fn set_reaction(&self, comment_id: &str, kind: ReactionKind) -> Result<(), AdapterError> {
        let content = match kind {
            ReactionKind::Eyes => "eyes",
            ReactionKind::ThumbsUp => "+1",
            ReactionKind::Confused => "confused",
        };
        // Repo is not part of this trait method's signature; callers route
        // through `add_comment`'s returned id in practice. Left best-effort.
        let path = format!("/reactions/{comment_id}");
        let req = self
            .request(reqwest::Method::POST, &path)
            .json(&json!({ "content": content }));
        self.send(req).await?;
        Ok(())
    }

    async fn last_status_actor(&self, _repo: &str, _ticket_id: u64) -> Result<Option<String>, AdapterError> {
        Err(AdapterError::Schema(
            "last_status_actor requires the GraphQL audit log, not implemented".to_string(),
        ))
    }

    async fn last_label_actor(
        &self,
        repo: &str,
        ticket_id: u64,
        label: &str,
    ) -> Result<Option<String>, AdapterError> {
        let path = format!("/repos/{repo}/issues/{ticket_id}/events?per_page=100");
        #[derive(Deserialize)]
        struct GhEvent {
            event: String,
            label: Option<GhLabel>,
            actor: Option<GhUser>,
        }
        #[derive(Deserialize)]
        struct GhUser {
            login: String,
        }
        let resp = self.send(self.request(reqwest::Method::GET, &path)).await?;
        let events: Vec<GhEvent> = resp
            .json()
            .await
            .map_err(|e| AdapterError::Schema(e.to_string()))?;
        Ok(events
            .into_iter()
            .rev()
            .find(|e| e.event == "labeled" && e.label.as_ref().map(|l| l.name == label).unwrap_or(false))
            .and_then(|e| e.actor)
            .map(|a| a.login))
    }

    async fn linked_pull_requests(&self, _repo: &str, _ticket_id: u64) -> Result<Vec<PullRequestRef>, AdapterError> {
        // Requires cross-referencing the timeline API; left best-effort.
        Ok(vec![])
    }

    async fn close_pull_request(&self, repo: &str, number: u64) -> Result<(), AdapterError> {
        let path = format!("/repos/{repo}/pulls/{number}");
        let req = self
            .request(reqwest::Method::PATCH, &path)
            .json(&json!({ "state": "closed" }));
        self.send(req).await?;
        Ok(())
    }

    async fn delete_branch(&self, repo: &str, name: &str) -> Result<(), AdapterError> {
        let path = format!("/repos/{repo}/git/refs/heads/{name}");
        self.send(self.request(reqwest::Method::DELETE, &path)).await?;
        Ok(())
    }
}

/// GitHub issues have no native "status column" outside of ProjectsV2;
/// without the GraphQL projects API this falls back to open/closed.
fn project_status_placeholder(state: &str) -> &str {
    if state == "open" {
        "Unknown"
    } else {
        "Done"
    }
}

#[cfg(test)]
#[path = "github_tests.rs"]
mod tests;
