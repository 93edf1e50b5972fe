//! Daemonized start (`-D`)

use crate::helpers::*;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use std::fs;
use supervise::fs::{RunDir, SingletonLock, StatusStore};
use tempfile::TempDir;

/// Stops a daemonized supervisor if a test bails out early.
struct DaemonGuard<'a>(&'a RunDir);

impl Drop for DaemonGuard<'_> {
    fn drop(&mut self) {
        if SingletonLock::try_acquire(&self.0.lock_path()).is_err() {
            let store = StatusStore::new(self.0);
            if let Some(pid) = store.read_supervisor_pid() {
                let _ = nix::sys::signal::kill(Pid::from_raw(pid as i32), Signal::SIGKILL);
            }
            if let Some(pid) = store.read_child_pid() {
                let _ = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL);
            }
        }
    }
}

fn lock_released(run_dir: &RunDir) -> bool {
    SingletonLock::try_acquire(&run_dir.lock_path())
        .map(|lock| lock.release().is_ok())
        .unwrap_or(false)
}

#[test]
fn test_daemon_start_detaches_and_stops() {
    let temp_dir = TempDir::new().unwrap();
    let run_dir = RunDir::new(temp_dir.path());
    let _guard = DaemonGuard(&run_dir);
    let store = StatusStore::new(&run_dir);

    let output = supervise_command(run_dir.root())
        .args(["-D", "-c", "sleep 100"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));

    assert!(
        wait_for(TIMEOUT, || store.read_child_pid().is_some()
            && run_dir.control_path().exists()),
        "daemon never started a child"
    );
    assert!(run_dir.log_path().exists());
    let daemon = store.read_supervisor_pid().expect("no supervisor pid");
    assert!(!is_dead(daemon));

    // A second daemonized start is refused by the first phase.
    let second = supervise_command(run_dir.root())
        .args(["-D", "-c", "sleep 100"])
        .output()
        .unwrap();
    assert_eq!(second.status.code(), Some(100));

    let child = store.read_child_pid().unwrap();
    assert!(run_action(run_dir.root(), "stop").status.success());

    assert!(wait_for(TIMEOUT, || lock_released(&run_dir)), "daemon kept the lock");
    assert!(wait_for(TIMEOUT, || is_dead(child)));

    let log = fs::read_to_string(run_dir.log_path()).unwrap();
    assert!(log.contains("started"), "{log}");
}
