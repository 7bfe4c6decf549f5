// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Comments as seen by the CommentReactor, and the per-item cursor that
//! tracks how far it has already read.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author: String,
    /// ISO-8601 timestamp, as returned by the TicketAdapter. Compared
    /// lexicographically, which is valid for the adapter's fixed format.
    pub created_at: String,
    pub body: String,
}

/// Per-item watermark: the timestamp of the last comment the reactor has
/// already considered. Owned by the Store; the CommentReactor reads and
/// advances it but never rewinds it (cursor monotonicity, SPEC_FULL.md §12).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommentCursor {
    pub last_seen_at: Option<String>,
}

impl CommentCursor {
    pub fn advance_to(&mut self, timestamp: impl Into<String>) {
        let timestamp = timestamp.into();
        if self
            .last_seen_at
            .as_ref()
            .map(|seen| timestamp.as_str() > seen.as_str())
            .unwrap_or(true)
        {
            self.last_seen_at = Some(timestamp);
        }
    }

    pub fn is_new(&self, comment: &Comment) -> bool {
        match &self.last_seen_at {
            None => true,
            Some(seen) => comment.created_at.as_str() > seen.as_str(),
        }
    }
}

#[cfg(test)]
#[path = "comment_tests.rs"]
mod tests;
