//! `kiln start` refuses to run when a live instance already holds the lock.

use crate::prelude::{OutputExt, StateDir};

#[test]
fn refuses_to_start_over_a_live_instance() {
    let state = StateDir::new();
    let mut sleeper = std::process::Command::new("sleep")
        .arg("30")
        .spawn()
        .expect("spawn sleep");
    std::fs::write(state.lock_path(), format!("{}\n", sleeper.id())).expect("write lock file");

    let output = state
        .kiln()
        .args(["start", "--foreground"])
        .output()
        .expect("kiln start should run");

    assert!(!output.status.success());
    assert!(output.stderr_string().contains("already running"));

    let _ = sleeper.kill();
    let _ = sleeper.wait();
}
