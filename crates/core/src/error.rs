// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy shared by every component that talks to the ticketing
//! platform. The policy column lives in each consumer, not here: this module
//! only carries the classification.

use thiserror::Error;

/// Errors a `TicketAdapter` call can surface, classified by the policy the
/// core applies to them.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("authorization error: {0}")]
    Authorization(String),

    #[error("platform unreachable: {0}")]
    PlatformUnreachable(String),

    #[error("transient adapter error: {0}")]
    Transient(String),

    #[error("schema error: {0}")]
    Schema(String),
}

impl AdapterError {
    /// Whether this error should trip `HibernationControl`.
    pub fn is_platform_unreachable(&self) -> bool {
        matches!(self, AdapterError::PlatformUnreachable(_))
    }

    /// Whether this error should terminate the daemon immediately.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AdapterError::Configuration(_) | AdapterError::Authorization(_)
        )
    }
}

/// Errors raised by the orchestration core itself, as opposed to its
/// external collaborators.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// Another actor won the claim for a running label. Not a failure:
    /// callers treat this as a no-op, never as a cycle failure.
    #[error("race lost on {repo}#{ticket_id} claiming {label} (actor={actor})")]
    RaceLost {
        repo: String,
        ticket_id: u64,
        label: String,
        actor: String,
    },

    #[error("storage error: {0}")]
    Storage(String),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
