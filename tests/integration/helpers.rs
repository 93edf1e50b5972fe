//! Helpers for driving the `supervise` binary in tests

use nix::sys::signal::{kill, killpg, Signal};
use nix::unistd::Pid;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use supervise::fs::{RunDir, StatusStore};
use tempfile::TempDir;

pub const TIMEOUT: Duration = Duration::from_secs(10);

pub fn binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_supervise"))
}

/// Base command with a clean environment for the markers the binary reads.
pub fn supervise_command(run_dir: &Path) -> Command {
    let mut command = Command::new(binary());
    command
        .arg("-d")
        .arg(run_dir)
        .env_remove("SU_BACKGROUND")
        .env_remove("SU_CMD")
        .env_remove("SU_STATUS_DIR")
        .env("RUST_LOG", "debug")
        .stdin(Stdio::null());
    command
}

/// Poll `condition` until it holds or the timeout elapses.
pub fn wait_for<F: FnMut() -> bool>(timeout: Duration, mut condition: F) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(25));
    }
}

/// Run a client action (`stop`, `pause`, ...) to completion.
pub fn run_action(run_dir: &Path, action: &str) -> Output {
    supervise_command(run_dir)
        .args(["-s", action])
        .output()
        .expect("Failed to run client action")
}

/// Write a raw byte to the control pipe, like an operator using `echo`.
pub fn send_byte(run_dir: &Path, byte: u8) {
    let mut pipe = OpenOptions::new()
        .write(true)
        .open(RunDir::new(run_dir).control_path())
        .expect("Failed to open control pipe");
    pipe.write_all(&[byte]).expect("Failed to write control pipe");
}

pub fn child_pid(run_dir: &Path) -> Option<u32> {
    StatusStore::new(&RunDir::new(run_dir)).read_child_pid()
}

/// True once the process is gone or only a zombie awaiting its parent.
pub fn is_dead(pid: u32) -> bool {
    match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        Ok(stat) => stat
            .rsplit_once(')')
            .map(|(_, rest)| rest.trim_start().starts_with('Z'))
            .unwrap_or(false),
        Err(_) => !supervise::process::is_process_alive(pid),
    }
}

/// A foreground supervisor started by a test.
///
/// Dropping it kills the supervisor and the supervised process group, so a
/// failing test never leaks processes.
pub struct Supervisor {
    pub run_dir: TempDir,
    child: Child,
}

impl Supervisor {
    /// Start `supervise -c <command_line>` and wait until the first child is recorded.
    pub fn start(command_line: &str) -> Self {
        let run_dir = TempDir::new().expect("Failed to create run dir");
        Self::start_in(run_dir, command_line)
    }

    pub fn start_in(run_dir: TempDir, command_line: &str) -> Self {
        let child = supervise_command(run_dir.path())
            .args(["-c", command_line])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("Failed to start supervisor");

        let supervisor = Self { run_dir, child };
        assert!(
            wait_for(TIMEOUT, || supervisor.child_pid().is_some()
                && supervisor.path().join("control").exists()),
            "supervisor never started a child"
        );
        supervisor
    }

    pub fn path(&self) -> &Path {
        self.run_dir.path()
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    pub fn child_pid(&self) -> Option<u32> {
        child_pid(self.path())
    }

    pub fn send(&self, byte: u8) {
        send_byte(self.path(), byte);
    }

    /// Wait for the supervisor process to exit.
    pub fn wait_exit(&mut self, timeout: Duration) -> Option<ExitStatus> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = self.child.try_wait().expect("try_wait failed") {
                return Some(status);
            }
            if Instant::now() >= deadline {
                return None;
            }
            thread::sleep(Duration::from_millis(25));
        }
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            if let Some(pid) = self.child_pid() {
                let _ = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL);
            }
            let _ = kill(Pid::from_raw(self.child.id() as i32), Signal::SIGKILL);
            let _ = self.child.wait();
        }
    }
}
