// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use kiln_adapters::{FakeTicketAdapter, PullRequestRef, TicketAdapter};
use kiln_core::{Item, Status};
use kiln_storage::InMemoryStore;

#[test]
fn strip_generated_sections_removes_markers_and_content_only() {
    let body = "preamble\n<!-- kiln:research -->XYZ<!-- /kiln:research -->\npostamble";
    assert_eq!(strip_generated_sections(body), "preamble\n\npostamble");
}

#[test]
fn strip_generated_sections_leaves_untouched_text_alone() {
    let body = "nothing generated here";
    assert_eq!(strip_generated_sections(body), body);
}

#[tokio::test]
async fn run_closes_prs_deletes_branches_strips_body_and_resets_status() {
    let adapter = FakeTicketAdapter::new("kiln-bot");
    let item = ItemKey::new("acme/widgets", 1);
    adapter.seed_items(
        "acme/widgets",
        vec![Item {
            key: item.clone(),
            status: Status::Implement,
            labels: vec!["implementing".to_string(), "reset".to_string()],
            title: "thing".to_string(),
            open: true,
            comment_count: 0,
            merged: false,
        }],
    );
    adapter.seed_body(
        item.clone(),
        "preamble\n<!-- kiln:research -->XYZ<!-- /kiln:research -->\npostamble",
    );
    adapter.seed_pull_requests(
        item.clone(),
        vec![PullRequestRef {
            number: 42,
            branch: "kiln/research-1".to_string(),
        }],
    );

    let store = InMemoryStore::new();
    run(&adapter, &store, &item).await;

    assert_eq!(
        adapter.get_body("acme/widgets", 1).await.unwrap(),
        "preamble\n\npostamble"
    );
    assert_eq!(adapter.status_of(&item), Some(Status::Backlog));
    assert!(!adapter.labels_of(&item).contains(&"reset".to_string()));
    assert!(!adapter.labels_of(&item).contains(&"implementing".to_string()));
    assert!(adapter
        .calls()
        .iter()
        .any(|c| matches!(c, kiln_adapters::TicketCall::ClosePullRequest { number: 42, .. })));
    assert!(adapter
        .calls()
        .iter()
        .any(|c| matches!(c, kiln_adapters::TicketCall::DeleteBranch { name, .. } if name == "kiln/research-1")));
}
