// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use kiln_adapters::{FakeTicketAdapter, TicketAdapter};
use kiln_storage::InMemoryStore;

#[tokio::test]
async fn successful_advance_sets_the_next_status() {
    let adapter = FakeTicketAdapter::new("kiln-bot");
    let store = InMemoryStore::new();
    let item = ItemKey::new("acme/widgets", 1);

    advance(&adapter, &store, &item, &Status::Plan).await.unwrap();

    assert!(adapter.last_status_actor("acme/widgets", 1).await.unwrap().is_some());
}

#[tokio::test]
async fn failed_advance_adds_yolo_failed_and_propagates_the_error() {
    let adapter = FakeTicketAdapter::new("kiln-bot");
    let store = InMemoryStore::new();
    adapter.fail_next_set_status("platform hiccup");
    let item = ItemKey::new("acme/widgets", 1);

    let result = advance(&adapter, &store, &item, &Status::Plan).await;

    assert!(result.is_err());
    assert!(adapter
        .last_label_actor("acme/widgets", 1, YOLO_FAILED_LABEL)
        .await
        .unwrap()
        .is_some());
}
