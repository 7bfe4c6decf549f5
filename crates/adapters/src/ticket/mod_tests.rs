// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn board_is_hashable_for_use_as_a_poll_key() {
    use std::collections::HashSet;
    let mut seen = HashSet::new();
    seen.insert(Board {
        repo: "acme/widgets".to_string(),
        project: "Kiln".to_string(),
    });
    assert!(seen.contains(&Board {
        repo: "acme/widgets".to_string(),
        project: "Kiln".to_string(),
    }));
}

#[test]
fn pull_request_ref_roundtrips_through_json() {
    let pr = PullRequestRef {
        number: 42,
        branch: "kiln/acme-widgets-7".to_string(),
    };
    let json = serde_json::to_string(&pr).expect("serialize");
    let back: PullRequestRef = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(pr, back);
}
