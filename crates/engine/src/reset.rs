// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Full wipe-and-return-to-Backlog handler for the `reset` control label
//! (SPEC_FULL.md §4.9). Every step is best-effort: a failure is logged and
//! the item is re-examined next cycle rather than aborting the whole reset.
//! `reset` itself is removed last so a partially-failed reset re-enters the
//! handler on the next pass.

use crate::effects::apply_effect;
use kiln_adapters::TicketAdapter;
use kiln_core::{label, Effect, ItemKey, Status};
use kiln_storage::Store;

const MARKERS: [(&str, &str); 2] = [
    ("<!-- kiln:research -->", "<!-- /kiln:research -->"),
    ("<!-- kiln:plan -->", "<!-- /kiln:plan -->"),
];

/// Strips every marker pair (and the generated content between them) from
/// `body`, leaving everything outside the markers untouched. Pure: the I/O
/// of reading and writing the body lives in `run`.
pub fn strip_generated_sections(body: &str) -> String {
    let mut result = body.to_string();
    for (open, close) in MARKERS {
        while let Some(start) = result.find(open) {
            if let Some(end_rel) = result[start..].find(close) {
                let end = start + end_rel + close.len();
                result.replace_range(start..end, "");
            } else {
                break;
            }
        }
    }
    result
}

/// Runs the full reset sequence for one item. Closes linked PRs and deletes
/// their branches, strips generated content from the body, removes every
/// kiln-owned label, moves status to Backlog, then removes `reset` last.
/// Every write goes through `effects::apply_effect` one at a time; a failed
/// step is logged and the remaining steps still run (best-effort).
pub async fn run(adapter: &dyn TicketAdapter, store: &dyn Store, item: &ItemKey) {
    match adapter.linked_pull_requests(&item.repo, item.ticket_id).await {
        Ok(prs) => {
            for pr in prs {
                let close = Effect::ClosePullRequest {
                    repo: item.repo.clone(),
                    number: pr.number,
                };
                if let Err(e) = apply_effect(adapter, store, &close).await {
                    tracing::warn!(repo = %item.repo, ticket_id = item.ticket_id, number = pr.number, error = %e, "reset: failed to close linked PR");
                }
                let delete_branch = Effect::DeleteBranch {
                    repo: item.repo.clone(),
                    name: pr.branch.clone(),
                };
                if let Err(e) = apply_effect(adapter, store, &delete_branch).await {
                    tracing::warn!(repo = %item.repo, ticket_id = item.ticket_id, branch = %pr.branch, error = %e, "reset: failed to delete branch");
                }
            }
        }
        Err(e) => {
            tracing::warn!(repo = %item.repo, ticket_id = item.ticket_id, error = %e, "reset: failed to list linked PRs");
        }
    }

    match adapter.get_body(&item.repo, item.ticket_id).await {
        Ok(body) => {
            let stripped = strip_generated_sections(&body);
            if stripped != body {
                let update_body = Effect::UpdateBody {
                    item: item.clone(),
                    new_body: stripped,
                };
                if let Err(e) = apply_effect(adapter, store, &update_body).await {
                    tracing::warn!(repo = %item.repo, ticket_id = item.ticket_id, error = %e, "reset: failed to update body");
                }
            }
        }
        Err(e) => {
            tracing::warn!(repo = %item.repo, ticket_id = item.ticket_id, error = %e, "reset: failed to fetch body");
        }
    }

    for owned_label in label::all_kiln_labels().filter(|l| *l != "reset") {
        let remove = Effect::RemoveLabel {
            item: item.clone(),
            label: owned_label.to_string(),
        };
        if let Err(e) = apply_effect(adapter, store, &remove).await {
            tracing::warn!(repo = %item.repo, ticket_id = item.ticket_id, label = owned_label, error = %e, "reset: failed to remove label");
        }
    }

    let backlog = Effect::SetStatus {
        item: item.clone(),
        status: Status::Backlog.as_str().to_string(),
    };
    if let Err(e) = apply_effect(adapter, store, &backlog).await {
        tracing::warn!(repo = %item.repo, ticket_id = item.ticket_id, error = %e, "reset: failed to move status to Backlog");
    }

    let remove_reset = Effect::RemoveLabel {
        item: item.clone(),
        label: "reset".to_string(),
    };
    if let Err(e) = apply_effect(adapter, store, &remove_reset).await {
        tracing::warn!(repo = %item.repo, ticket_id = item.ticket_id, error = %e, "reset: failed to remove reset label");
    }
}

#[cfg(test)]
#[path = "reset_tests.rs"]
mod tests;
