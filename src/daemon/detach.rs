//! Two-phase daemonization.
//!
//! Phase 1 runs in the foreground: it re-launches the same executable with the
//! same arguments in a new session, marked with `SU_BACKGROUND=1`, and exits.
//! Phase 2 sees the marker and goes straight to lock acquisition and the
//! engine. The marker keeps phase 2 from detaching again.

use crate::config::{Config, ENV_BACKGROUND, ENV_CMD, ENV_STATUS_DIR};
use crate::fs::RunDir;
use anyhow::{Context, Result};
use nix::unistd::setsid;
use std::fs::OpenOptions;
use std::io;
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};

/// Launch the detached phase-2 copy of this process.
///
/// stdin is `/dev/null`; stdout and stderr are appended to `supervise.log` in
/// the run directory.
///
/// # Returns
/// The pid of the background copy.
pub fn detach(config: &Config, run_dir: &RunDir) -> Result<u32> {
    let exe = std::env::current_exe().context("Failed to locate own executable")?;
    let cwd = std::env::current_dir().context("Failed to get current directory")?;

    let log_path = run_dir.log_path();
    let log = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;
    let log_err = log.try_clone().context("Failed to duplicate log file")?;

    let mut command = background_command(exe, config);
    command
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::from(log))
        .stderr(Stdio::from(log_err));

    // SAFETY: setsid is async-signal-safe.
    unsafe {
        command.pre_exec(|| setsid().map(|_| ()).map_err(io::Error::from));
    }

    let child = command
        .spawn()
        .context("Failed to launch background supervisor")?;

    Ok(child.id())
}

/// The phase-2 command line: same arguments, plus the environment markers.
fn background_command(exe: std::path::PathBuf, config: &Config) -> Command {
    let mut command = Command::new(exe);
    command
        .args(std::env::args_os().skip(1))
        .env(ENV_BACKGROUND, "1")
        .env(ENV_STATUS_DIR, &config.run_dir)
        .env(ENV_CMD, &config.command_line);
    command
}
