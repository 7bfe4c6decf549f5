// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn key() -> ItemKey {
    ItemKey::new("acme/widgets", 7)
}

#[test]
fn effect_name_is_stable_for_logging() {
    assert_eq!(
        Effect::AddLabel {
            item: key(),
            label: "researching".into()
        }
        .name(),
        "add_label"
    );
    assert_eq!(
        Effect::SetReaction {
            comment_id: "c1".into(),
            kind: ReactionKind::Eyes
        }
        .name(),
        "set_reaction"
    );
}

#[test]
fn effect_item_is_none_for_repo_scoped_effects() {
    let e = Effect::ClosePullRequest {
        repo: "acme/widgets".into(),
        number: 12,
    };
    assert!(e.item().is_none());
}

#[test]
fn effect_item_is_some_for_item_scoped_effects() {
    let e = Effect::RemoveLabel {
        item: key(),
        label: "researching".into(),
    };
    assert_eq!(e.item(), Some(&key()));
}

#[test]
fn effect_serde_roundtrip() {
    let e = Effect::RecordRunHistory {
        item: key(),
        workflow: "research".into(),
        started_at_ms: 10,
        finished_at_ms: 20,
        outcome: "success".into(),
        session_ref: Some("sess-1".into()),
    };
    let json = serde_json::to_string(&e).unwrap();
    let parsed: Effect = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, e);
}
