// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use kiln_core::Status;

fn item(repo: &str, ticket_id: u64) -> Item {
    Item {
        key: ItemKey::new(repo, ticket_id),
        status: Status::Backlog,
        labels: vec![],
        title: "Widget support".to_string(),
        open: true,
        comment_count: 0,
        merged: false,
    }
}

#[tokio::test]
async fn add_label_is_idempotent_and_recorded_on_the_item() {
    let fake = FakeTicketAdapter::new("kiln-bot");
    fake.seed_items("acme/widgets", vec![item("acme/widgets", 1)]);

    fake.add_label("acme/widgets", 1, "research").await.unwrap();
    fake.add_label("acme/widgets", 1, "research").await.unwrap();

    assert_eq!(fake.labels_of(&ItemKey::new("acme/widgets", 1)), vec!["research"]);
}

#[tokio::test]
async fn remove_label_clears_recorded_actor() {
    let fake = FakeTicketAdapter::new("kiln-bot");
    let key = ItemKey::new("acme/widgets", 1);
    fake.seed_items("acme/widgets", vec![item("acme/widgets", 1)]);

    fake.add_label("acme/widgets", 1, "research").await.unwrap();
    assert_eq!(
        fake.last_label_actor("acme/widgets", 1, "research").await.unwrap(),
        Some("kiln-bot".to_string())
    );

    fake.remove_label("acme/widgets", 1, "research").await.unwrap();
    assert_eq!(fake.last_label_actor("acme/widgets", 1, "research").await.unwrap(), None);
    assert!(fake.labels_of(&key).is_empty());
}

#[tokio::test]
async fn forced_label_actor_simulates_a_race_against_another_actor() {
    let fake = FakeTicketAdapter::new("kiln-bot");
    let key = ItemKey::new("acme/widgets", 1);
    fake.seed_items("acme/widgets", vec![item("acme/widgets", 1)]);
    fake.force_label_actor(key.clone(), "research", "someone-else");

    fake.add_label("acme/widgets", 1, "research").await.unwrap();

    assert_eq!(
        fake.last_label_actor("acme/widgets", 1, "research").await.unwrap(),
        Some("someone-else".to_string())
    );
}

#[tokio::test]
async fn list_comments_since_only_returns_strictly_newer_comments() {
    let fake = FakeTicketAdapter::new("kiln-bot");
    let key = ItemKey::new("acme/widgets", 1);
    fake.seed_comments(
        key.clone(),
        vec![
            Comment {
                id: "c1".to_string(),
                author: "alice".to_string(),
                created_at: "2026-01-01T00:00:01Z".to_string(),
                body: "first".to_string(),
            },
            Comment {
                id: "c2".to_string(),
                author: "bob".to_string(),
                created_at: "2026-01-01T00:00:02Z".to_string(),
                body: "second".to_string(),
            },
        ],
    );

    let since = fake
        .list_comments_since("acme/widgets", 1, Some("2026-01-01T00:00:01Z"))
        .await
        .unwrap();
    assert_eq!(since.len(), 1);
    assert_eq!(since[0].id, "c2");

    let all = fake.list_comments_since("acme/widgets", 1, None).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn calls_are_recorded_in_invocation_order() {
    let fake = FakeTicketAdapter::new("kiln-bot");
    fake.seed_items("acme/widgets", vec![item("acme/widgets", 1)]);

    fake.add_label("acme/widgets", 1, "research").await.unwrap();
    fake.add_comment("acme/widgets", 1, "starting").await.unwrap();

    assert_eq!(
        fake.calls(),
        vec![
            TicketCall::AddLabel {
                repo: "acme/widgets".to_string(),
                ticket_id: 1,
                label: "research".to_string(),
            },
            TicketCall::AddComment {
                repo: "acme/widgets".to_string(),
                ticket_id: 1,
            },
        ]
    );
}

#[tokio::test]
async fn set_status_updates_the_seeded_item_and_last_actor() {
    let fake = FakeTicketAdapter::new("kiln-bot");
    fake.seed_items("acme/widgets", vec![item("acme/widgets", 1)]);

    fake.set_status("acme/widgets", 1, "Research").await.unwrap();

    assert_eq!(fake.status_of(&ItemKey::new("acme/widgets", 1)), Some(Status::Research));
    assert_eq!(
        fake.last_status_actor("acme/widgets", 1).await.unwrap(),
        Some("kiln-bot".to_string())
    );
}
