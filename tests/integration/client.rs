//! Client invocations against a running (or absent) supervisor

use crate::helpers::*;
use tempfile::TempDir;

#[test]
fn test_second_start_exits_with_running_code() {
    let supervisor = Supervisor::start("sleep 100");
    let first = supervisor.child_pid().unwrap();

    let output = supervise_command(supervisor.path())
        .args(["-c", "sleep 100"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(100));
    assert_eq!(supervisor.child_pid(), Some(first));
    assert!(!is_dead(first));
}

#[test]
fn test_stop_action_quits_supervisor() {
    let mut supervisor = Supervisor::start("sleep 100");
    let child = supervisor.child_pid().unwrap();

    let output = run_action(supervisor.path(), "stop");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Sent x"));

    let status = supervisor.wait_exit(TIMEOUT).expect("supervisor did not exit");
    assert_eq!(status.code(), Some(0));
    assert!(wait_for(TIMEOUT, || is_dead(child)));
}

#[test]
fn test_kill_and_pause_actions() {
    let mut supervisor = Supervisor::start("sleep 100");
    let first = supervisor.child_pid().unwrap();

    assert!(run_action(supervisor.path(), "kill").status.success());
    assert!(wait_for(TIMEOUT, || supervisor
        .child_pid()
        .is_some_and(|pid| pid != first)));
    let second = supervisor.child_pid().unwrap();

    assert!(run_action(supervisor.path(), "pause").status.success());
    assert!(wait_for(TIMEOUT, || is_dead(second)));

    assert!(run_action(supervisor.path(), "resume").status.success());
    assert!(wait_for(TIMEOUT, || supervisor
        .child_pid()
        .is_some_and(|pid| pid != second)));

    assert!(run_action(supervisor.path(), "stop").status.success());
    assert_eq!(
        supervisor.wait_exit(TIMEOUT).and_then(|s| s.code()),
        Some(0)
    );
}

#[test]
fn test_stop_without_supervisor_is_noop() {
    let run_dir = TempDir::new().unwrap();

    let output = run_action(run_dir.path(), "stop");

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("not running"));
    assert!(!run_dir.path().join("control").exists());
}

#[test]
fn test_status_action_reports_pids() {
    let supervisor = Supervisor::start("sleep 100");
    let child = supervisor.child_pid().unwrap();

    let output = run_action(supervisor.path(), "status");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains(&supervisor.pid().to_string()), "{stdout}");
    assert!(stdout.contains(&child.to_string()), "{stdout}");
}

#[test]
fn test_status_action_when_stopped() {
    let run_dir = TempDir::new().unwrap();

    let output = run_action(run_dir.path(), "status");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("not running"));
}

#[test]
fn test_start_without_command_fails() {
    let run_dir = TempDir::new().unwrap();

    let output = supervise_command(run_dir.path()).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(!run_dir.path().join("supervise.lock").exists());
}
