//! Immutable supervisor configuration.
//!
//! The CLI front-end in `main.rs` produces a [`Config`] once; nothing mutates it
//! afterwards. A daemonized background copy rebuilds the same value from the
//! environment markers below instead of re-parsing anything interactive.

use crate::daemon::ControlCommand;
use crate::error::{Result, SuperviseError};
use clap::ValueEnum;
use std::path::PathBuf;

/// Set to `1` in the environment of a re-launched background copy.
pub const ENV_BACKGROUND: &str = "SU_BACKGROUND";

/// Run directory marker.
pub const ENV_STATUS_DIR: &str = "SU_STATUS_DIR";

/// Child command line marker.
pub const ENV_CMD: &str = "SU_CMD";

/// What this invocation was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Action {
    /// Become the supervising server for the run directory
    Start,
    /// Ask the running server to kill the child and exit
    Stop,
    /// Ask the running server to kill the child and stay idle
    Pause,
    /// Ask a paused server to start the child again
    Resume,
    /// Ask the running server to restart the child in place
    Kill,
    /// Report the supervisor and child process ids
    Status,
}

impl Action {
    /// The control command a client invocation delivers for this action, if any.
    pub fn command(self) -> Option<ControlCommand> {
        match self {
            Action::Stop => Some(ControlCommand::Quit),
            Action::Pause => Some(ControlCommand::Pause),
            Action::Resume => Some(ControlCommand::Resume),
            Action::Kill => Some(ControlCommand::Kill),
            Action::Start | Action::Status => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub run_dir: PathBuf,
    pub command_line: String,
    pub action: Action,
    pub daemonize: bool,
    /// This process is the detached second phase of a daemonized start.
    pub background: bool,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.action == Action::Start && self.command_line.trim().is_empty() {
            return Err(SuperviseError::InvalidConfig(
                "a command line is required to start (use --cmd or SU_CMD)".to_string(),
            ));
        }
        if self.run_dir.as_os_str().is_empty() {
            return Err(SuperviseError::InvalidConfig(
                "run directory must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Foreground first phase of a daemonized start.
    pub fn should_detach(&self) -> bool {
        self.action == Action::Start && self.daemonize && !self.background
    }
}

/// Whether the background marker is present in this process's environment.
pub fn background_from_env() -> bool {
    std::env::var(ENV_BACKGROUND).is_ok_and(|v| v == "1")
}

/// Default run directory: `<prefix>/run`, where the executable lives in `<prefix>/bin`.
pub fn default_run_dir() -> PathBuf {
    let exe = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("supervise"));
    let bin_dir = exe.parent().map(PathBuf::from).unwrap_or_default();
    let prefix = bin_dir.parent().map(PathBuf::from).unwrap_or(bin_dir);
    prefix.join("run")
}
