//! Child process management
//!
//! Spawns the supervised command in its own session (so it leads its own
//! process group), kills the whole group, and reaps exited children.

use crate::fs::StatusStore;
use nix::errno::Errno;
use nix::sys::signal::{kill, killpg, sigprocmask, SigSet, SigmaskHow, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{getpgid, getpgrp, setsid, Pid};
use std::io;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, error, info, warn};

/// Shell used to interpret the configured command line.
pub const SHELL: &str = "/bin/sh";

/// The side effects the supervisor engine needs from a child process.
///
/// Implementations track at most one child at a time.
pub trait ChildControl {
    /// Launch a new child and start tracking it. `None` if the launch failed.
    fn spawn(&mut self) -> Option<u32>;

    /// Forcefully terminate the tracked child's process group.
    ///
    /// Returns `true` if a live child was signalled, which means a
    /// child-exited notification will follow.
    fn kill(&mut self) -> bool;

    /// Collect exited children without blocking.
    ///
    /// Returns `true` if the tracked child has exited (or none was tracked).
    fn reap(&mut self) -> bool;

    /// Pid of the tracked child, if any.
    fn current(&self) -> Option<u32>;
}

/// Real [`ChildControl`] backed by `/bin/sh -c <command line>`.
pub struct ProcessManager {
    command_line: String,
    working_dir: PathBuf,
    status: StatusStore,
    child: Option<Pid>,
}

impl ProcessManager {
    pub fn new(command_line: &str, working_dir: &Path, status: StatusStore) -> Self {
        Self {
            command_line: command_line.to_string(),
            working_dir: working_dir.to_path_buf(),
            status,
            child: None,
        }
    }

    fn launch(&self) -> io::Result<u32> {
        let mut command = Command::new(SHELL);
        command
            .arg("-c")
            .arg(&self.command_line)
            .current_dir(&self.working_dir);

        // SAFETY: only async-signal-safe calls (setsid, sigprocmask) run between fork and exec.
        unsafe {
            command.pre_exec(|| {
                setsid().map_err(io::Error::from)?;
                sigprocmask(SigmaskHow::SIG_SETMASK, Some(&SigSet::empty()), None)
                    .map_err(io::Error::from)?;
                Ok(())
            });
        }

        // The Child handle is dropped on purpose: exits are collected by `reap`.
        command.spawn().map(|child| child.id())
    }
}

impl ChildControl for ProcessManager {
    fn spawn(&mut self) -> Option<u32> {
        match self.launch() {
            Ok(pid) => {
                self.child = i32::try_from(pid).ok().map(Pid::from_raw);
                if let Err(e) = self.status.write_child_pid(pid) {
                    warn!("{e:#}");
                }
                info!("child {pid} started");
                Some(pid)
            }
            Err(e) => {
                error!("Failed to start child `{}`: {e}", self.command_line);
                self.child = None;
                None
            }
        }
    }

    fn kill(&mut self) -> bool {
        let Some(pid) = self.child else {
            return false;
        };

        let pgid = match getpgid(Some(pid)) {
            Ok(pgid) => pgid,
            Err(e) => {
                debug!("child {pid} has no process group: {e}");
                return false;
            }
        };

        // Never signal our own group, even if setsid did not take effect.
        let result = if pgid == getpgrp() {
            kill(pid, Signal::SIGKILL)
        } else {
            killpg(pgid, Signal::SIGKILL)
        };

        match result {
            Ok(()) => {
                info!("killed child {pid} (group {pgid})");
                true
            }
            Err(e) => {
                debug!("failed to kill child {pid}: {e}");
                false
            }
        }
    }

    fn reap(&mut self) -> bool {
        loop {
            match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::Exited(pid, _)) | Ok(WaitStatus::Signaled(pid, _, _)) => {
                    debug!("reaped {pid}");
                    if self.child == Some(pid) {
                        self.child = None;
                    }
                }
                Ok(WaitStatus::StillAlive) | Err(Errno::ECHILD) => break,
                Ok(_) => continue,
                Err(Errno::EINTR) => continue,
                Err(e) => {
                    warn!("waitpid failed: {e}");
                    break;
                }
            }
        }

        self.child.is_none()
    }

    fn current(&self) -> Option<u32> {
        self.child.and_then(|pid| u32::try_from(pid.as_raw()).ok())
    }
}

/// Check if a process with the given PID is alive
///
/// Sends the null signal. `EPERM` still means the process exists; `ESRCH`
/// means it does not. A zombie counts as alive until it is reaped.
pub fn is_process_alive(pid: u32) -> bool {
    let Ok(pid_i32) = i32::try_from(pid) else {
        return false;
    };

    match kill(Pid::from_raw(pid_i32), None) {
        Ok(()) => true,
        Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}
