//! `kiln status` against a state directory with no running daemon.

use crate::prelude::{StateDir, OutputExt};

#[test]
fn reports_not_running_for_a_fresh_state_dir() {
    let state = StateDir::new();
    let output = state.kiln().arg("status").output().expect("kiln status should run");

    assert!(output.status.success());
    assert!(output.stdout_string().contains("kilnd is not running"));
}

#[test]
fn reports_running_when_the_lock_file_names_a_live_pid() {
    let state = StateDir::new();
    std::fs::write(state.lock_path(), format!("{}\n", std::process::id())).expect("write lock file");

    let output = state.kiln().arg("status").output().expect("kiln status should run");

    assert!(output.status.success());
    let stdout = output.stdout_string();
    assert!(stdout.contains("kilnd is running"));
    assert!(stdout.contains(&std::process::id().to_string()));
}

#[test]
fn ignores_a_stale_lock_file() {
    let state = StateDir::new();
    // No process will ever have this pid on a normal test host.
    std::fs::write(state.lock_path(), "999999998\n").expect("write lock file");

    let output = state.kiln().arg("status").output().expect("kiln status should run");

    assert!(output.status.success());
    assert!(output.stdout_string().contains("kilnd is not running"));
}
