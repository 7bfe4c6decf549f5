// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    research = { Stage::Research, "researching", Some("research_ready"), Some("research_failed") },
    plan = { Stage::Plan, "planning", Some("plan_ready"), None },
    implement = { Stage::Implement, "implementing", None, Some("implementation_failed") },
)]
fn stage_labels(
    stage: Stage,
    running: &str,
    ready: Option<&str>,
    failure: Option<&str>,
) {
    assert_eq!(stage.running_label(), running);
    assert_eq!(stage.ready_label(), ready);
    assert_eq!(stage.failure_label(), failure);
}

#[test]
fn status_parse_round_trips_known_columns() {
    for s in ["Backlog", "Research", "Plan", "Implement", "Review", "Done"] {
        assert_eq!(Status::parse(s).as_str(), s);
    }
}

#[test]
fn status_parse_unknown_is_passthrough() {
    let s = Status::parse("Triage");
    assert_eq!(s.as_str(), "Triage");
    assert!(matches!(s, Status::Unknown(_)));
}

#[test]
fn label_model_maps_status_to_canonical_labels() {
    let model = LabelModel;
    assert_eq!(model.running_label(&Status::Research), Some("researching"));
    assert_eq!(model.ready_label(&Status::Research), Some("research_ready"));
    assert_eq!(model.running_label(&Status::Done), None);
}

#[test]
fn label_model_is_running_classifies_running_labels_only() {
    let model = LabelModel;
    assert!(model.is_running("researching"));
    assert!(!model.is_running("research_ready"));
    assert!(!model.is_running("yolo"));
}

#[test]
fn running_labels_present_finds_all_matches() {
    let model = LabelModel;
    let labels = vec![
        "researching".to_string(),
        "yolo".to_string(),
        "planning".to_string(),
    ];
    let mut present = model.running_labels_present(&labels);
    present.sort_unstable();
    assert_eq!(present, vec!["planning", "researching"]);
}

#[test]
fn all_kiln_labels_covers_every_class() {
    let all: Vec<_> = all_kiln_labels().collect();
    assert!(all.contains(&"researching"));
    assert!(all.contains(&"research_ready"));
    assert!(all.contains(&"yolo"));
    assert!(all.contains(&"reset"));
    assert!(all.contains(&"research_failed"));
    assert!(all.contains(&"cleaned_up"));
}

#[test]
fn stage_next_status_follows_the_pipeline() {
    assert_eq!(Stage::Research.next_status(), Status::Plan);
    assert_eq!(Stage::Plan.next_status(), Status::Implement);
    assert_eq!(Stage::Implement.next_status(), Status::Review);
}
