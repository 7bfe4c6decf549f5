// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Auto-advance on the `yolo` control label (SPEC_FULL.md §4.8). Triggered
//! by `Decision::Advance`. Yolo transitions hold no running label — the
//! next poll cycle re-evaluates and triggers the next stage normally.

use crate::effects::apply_effect;
use kiln_adapters::TicketAdapter;
use kiln_core::{CoreError, Effect, ItemKey, Status};
use kiln_storage::Store;

pub const YOLO_FAILED_LABEL: &str = "yolo_failed";

/// Transitions `item` to `next_status`. On adapter failure, adds
/// `yolo_failed` instead of propagating — the item is re-examined next
/// cycle rather than the Poller treating this as fatal.
pub async fn advance(
    adapter: &dyn TicketAdapter,
    store: &dyn Store,
    item: &ItemKey,
    next_status: &Status,
) -> Result<(), CoreError> {
    let set_status = Effect::SetStatus {
        item: item.clone(),
        status: next_status.as_str().to_string(),
    };
    match apply_effect(adapter, store, &set_status).await {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::warn!(repo = %item.repo, ticket_id = item.ticket_id, error = %e, "yolo advance failed");
            let add_failed = Effect::AddLabel {
                item: item.clone(),
                label: YOLO_FAILED_LABEL.to_string(),
            };
            apply_effect(adapter, store, &add_failed).await?;
            Err(e)
        }
    }
}

#[cfg(test)]
#[path = "yolo_tests.rs"]
mod tests;
