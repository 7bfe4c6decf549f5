//! `kiln stop` against a state directory with no running daemon.

use crate::prelude::{StateDir, OutputExt};

#[test]
fn stop_is_a_noop_when_nothing_is_running() {
    let state = StateDir::new();
    let output = state.kiln().arg("stop").output().expect("kiln stop should run");

    assert!(output.status.success());
    assert!(output.stdout_string().contains("kilnd is not running"));
}

#[test]
fn stop_terminates_the_process_named_in_the_lock_file() {
    let state = StateDir::new();
    // Use a real long-lived child so the lock file names a live PID.
    let mut sleeper = std::process::Command::new("sleep")
        .arg("30")
        .spawn()
        .expect("spawn sleep");
    std::fs::write(state.lock_path(), format!("{}\n", sleeper.id())).expect("write lock file");

    let output = state.kiln().arg("stop").output().expect("kiln stop should run");
    assert!(output.status.success(), "stderr: {}", output.stderr_string());
    assert!(output.stdout_string().contains("stopped"));
    assert!(!crate::prelude::process_alive(sleeper.id()));

    let _ = sleeper.kill();
    let _ = sleeper.wait();
}
