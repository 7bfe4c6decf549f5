// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use std::io::Write;

fn clear_env() {
    for key in [
        "KILN_STATE_DIR",
        "KILN_POLL_INTERVAL",
        "KILN_MAX_CONCURRENT_WORKFLOWS",
        "KILN_WATCHED_STATUSES",
        "KILN_ALLOWED_USERNAME",
        "KILN_DAEMON_IDENTITY",
        "KILN_STALE_THRESHOLD",
        "KILN_HIBERNATION_PROBE_INTERVAL",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn load_fails_without_required_identity_fields() {
    clear_env();
    let err = Config::load(None);
    assert!(err.is_err());
}

#[test]
#[serial]
fn load_applies_defaults_when_only_required_fields_given() {
    clear_env();
    std::env::set_var("KILN_ALLOWED_USERNAME", "alice");
    std::env::set_var("KILN_DAEMON_IDENTITY", "kiln-bot");
    std::env::set_var("KILN_STATE_DIR", "/tmp/kiln-test-state");
    let cfg = Config::load(None).unwrap();
    assert_eq!(cfg.poll_interval, Duration::from_secs(30));
    assert_eq!(cfg.max_concurrent_workflows, 3);
    assert_eq!(cfg.stale_threshold, Duration::from_secs(3600));
    assert_eq!(cfg.hibernation_probe_interval, Duration::from_secs(300));
    assert_eq!(
        cfg.watched_statuses,
        vec!["Research".to_string(), "Plan".to_string(), "Implement".to_string()]
    );
    clear_env();
}

#[test]
#[serial]
fn env_vars_override_config_file() {
    clear_env();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        allowed_username = "from-file"
        daemon_identity = "from-file-bot"
        poll_interval = 15
        "#
    )
    .unwrap();

    std::env::set_var("KILN_ALLOWED_USERNAME", "from-env");
    std::env::set_var("KILN_DAEMON_IDENTITY", "from-env-bot");
    std::env::set_var("KILN_STATE_DIR", "/tmp/kiln-test-state-2");

    let cfg = Config::load(Some(file.path())).unwrap();
    assert_eq!(cfg.allowed_username, "from-env");
    assert_eq!(cfg.daemon_identity, "from-env-bot");
    // Not overridden by env, falls back to the file value.
    assert_eq!(cfg.poll_interval, Duration::from_secs(15));
    clear_env();
}

#[test]
fn derived_paths_live_under_state_dir() {
    let cfg = Config {
        state_dir: PathBuf::from("/tmp/kiln-derived"),
        poll_interval: Duration::from_secs(30),
        max_concurrent_workflows: 3,
        watched_statuses: vec!["Research".into()],
        allowed_username: "alice".into(),
        daemon_identity: "kiln-bot".into(),
        stage_models: HashMap::new(),
        stale_threshold: Duration::from_secs(3600),
        hibernation_probe_interval: Duration::from_secs(300),
        boards: vec![],
    };
    assert_eq!(cfg.lock_path(), PathBuf::from("/tmp/kiln-derived/kiln.lock"));
    assert_eq!(cfg.log_path(), PathBuf::from("/tmp/kiln-derived/kiln.log"));
    assert_eq!(cfg.db_path(), PathBuf::from("/tmp/kiln-derived/kiln.db"));
}
