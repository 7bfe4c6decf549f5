// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use kiln_adapters::{Board, FakeTicketAdapter, FakeWorkflowExecutor, TicketAdapter};
use kiln_core::{AdapterError, FakeClock, Item, Status};
use kiln_storage::InMemoryStore;
use std::time::Duration;

fn board() -> Board {
    Board {
        repo: "acme/widgets".to_string(),
        project: "main".to_string(),
    }
}

fn item(status: Status, labels: Vec<&str>) -> Item {
    Item {
        key: ItemKey::new("acme/widgets", 1),
        status,
        labels: labels.into_iter().map(str::to_string).collect(),
        title: "thing".to_string(),
        open: true,
        comment_count: 0,
        merged: false,
    }
}

fn poller(adapter: FakeTicketAdapter, executor: FakeWorkflowExecutor) -> Poller {
    Poller::new(
        vec![board()],
        Arc::new(adapter),
        Arc::new(InMemoryStore::new()),
        Arc::new(executor),
        Arc::new(FakeClock::new()),
        "kiln-bot",
        "alice",
        3,
        Duration::from_secs(30),
        Duration::from_secs(300),
        Duration::from_secs(300),
        Duration::from_secs(3600),
        vec!["Research".to_string(), "Plan".to_string(), "Implement".to_string()],
        CancellationToken::new(),
    )
}

async fn wait_for_dispatch(poller: &Poller, item: &ItemKey) {
    for _ in 0..200 {
        if poller.runner_pool.has_active_run(item) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("workflow was never dispatched");
}

#[tokio::test]
async fn research_item_triggers_a_workflow() {
    let adapter = FakeTicketAdapter::new("kiln-bot");
    adapter.seed_items("acme/widgets", vec![item(Status::Research, vec![])]);
    let mut poller = poller(adapter.clone(), FakeWorkflowExecutor::new());

    let outcome = poller.run_cycle().await.unwrap();
    assert!(matches!(outcome, CycleOutcome::Success));

    wait_for_dispatch(&poller, &ItemKey::new("acme/widgets", 1)).await;
    assert!(adapter
        .last_label_actor("acme/widgets", 1, "researching")
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn closed_item_gets_marked_cleaned_up() {
    let adapter = FakeTicketAdapter::new("kiln-bot");
    let mut closed = item(Status::Done, vec![]);
    closed.open = false;
    adapter.seed_items("acme/widgets", vec![closed]);
    let mut poller = poller(adapter.clone(), FakeWorkflowExecutor::new());

    poller.run_cycle().await.unwrap();

    assert!(adapter
        .labels_of(&ItemKey::new("acme/widgets", 1))
        .contains(&"cleaned_up".to_string()));
}

#[tokio::test]
async fn reset_label_wipes_item_back_to_backlog() {
    let adapter = FakeTicketAdapter::new("kiln-bot");
    adapter.seed_items(
        "acme/widgets",
        vec![item(Status::Implement, vec!["implementing", "reset"])],
    );
    let mut poller = poller(adapter.clone(), FakeWorkflowExecutor::new());

    poller.run_cycle().await.unwrap();

    assert_eq!(adapter.status_of(&ItemKey::new("acme/widgets", 1)), Some(Status::Backlog));
}

#[tokio::test]
async fn platform_unreachable_enters_hibernation_and_is_resumed_by_a_later_probe() {
    let adapter = FakeTicketAdapter::new("kiln-bot");
    adapter.fail_next_list_items(AdapterError::PlatformUnreachable("connection reset".to_string()));
    let mut poller = poller(adapter.clone(), FakeWorkflowExecutor::new());

    let outcome = poller.run_cycle().await.unwrap();
    assert!(matches!(outcome, CycleOutcome::Hibernating));
    assert!(poller.hibernation.is_hibernating());

    adapter.seed_items("acme/widgets", vec![]);
    let outcome = poller.run_cycle().await.unwrap();
    assert!(matches!(outcome, CycleOutcome::Success));
    assert!(!poller.hibernation.is_hibernating());
}

#[tokio::test]
async fn two_running_labels_are_stripped_as_an_invariant_violation() {
    let adapter = FakeTicketAdapter::new("kiln-bot");
    adapter.seed_items(
        "acme/widgets",
        vec![item(Status::Implement, vec!["researching", "implementing"])],
    );
    let mut poller = poller(adapter.clone(), FakeWorkflowExecutor::new());

    poller.run_cycle().await.unwrap();

    let labels = adapter.labels_of(&ItemKey::new("acme/widgets", 1));
    assert!(!labels.contains(&"researching".to_string()));
    assert!(!labels.contains(&"implementing".to_string()));
}

#[tokio::test]
async fn stale_running_label_with_no_local_run_and_self_as_last_actor_is_recovered() {
    let adapter = FakeTicketAdapter::new("kiln-bot");
    adapter.seed_items("acme/widgets", vec![item(Status::Research, vec!["researching"])]);
    // Stamp this daemon's identity as the last actor on the running label,
    // simulating a crash after claiming it but before the workflow finished.
    adapter.add_label("acme/widgets", 1, "researching").await.unwrap();
    let mut poller = poller(adapter.clone(), FakeWorkflowExecutor::new());

    poller.run_cycle().await.unwrap();

    assert!(!adapter
        .labels_of(&ItemKey::new("acme/widgets", 1))
        .contains(&"researching".to_string()));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!poller.runner_pool.has_active_run(&ItemKey::new("acme/widgets", 1)));
    assert_eq!(poller.runner_pool.active_count(), 0);

    // Nothing owns the item anymore, so the next cycle re-triggers Research.
    let outcome = poller.run_cycle().await.unwrap();
    assert!(matches!(outcome, CycleOutcome::Success));
    wait_for_dispatch(&poller, &ItemKey::new("acme/widgets", 1)).await;
    assert!(adapter
        .last_label_actor("acme/widgets", 1, "researching")
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn self_authored_status_does_not_retrigger_the_workflow() {
    let adapter = FakeTicketAdapter::new("kiln-bot");
    adapter.seed_items("acme/widgets", vec![item(Status::Research, vec![])]);
    // Stamps "kiln-bot" (the fake's configured actor, matching this
    // poller's identity) as the last status actor without changing the
    // status itself.
    adapter.set_status("acme/widgets", 1, "Research").await.unwrap();
    let mut poller = poller(adapter.clone(), FakeWorkflowExecutor::new());

    poller.run_cycle().await.unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!poller.runner_pool.has_active_run(&ItemKey::new("acme/widgets", 1)));
}

#[tokio::test]
async fn fatal_error_propagates_instead_of_being_swallowed() {
    let adapter = FakeTicketAdapter::new("kiln-bot");
    adapter.fail_next_list_items(AdapterError::Authorization("token revoked".to_string()));
    let mut poller = poller(adapter, FakeWorkflowExecutor::new());

    let result = poller.run_cycle().await;
    assert!(result.is_err());
}
