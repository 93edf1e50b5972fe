//! Client actions - deliver one command byte to the running supervisor

use crate::daemon::{ControlChannel, ControlCommand};
use crate::error::SuperviseError;
use crate::fs::{RunDir, SingletonLock};
use anyhow::{Context, Result};
use colored::Colorize;
use tracing::info;

/// Whether the command reached a running supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    NotRunning,
}

/// Send `command` if an instance holds the lock for `run_dir`.
///
/// If the lock is free there is nothing to control: the lock is released
/// again and the control pipe is left untouched.
pub fn execute(run_dir: &RunDir, command: ControlCommand) -> Result<Delivery> {
    run_dir.create()?;

    match SingletonLock::try_acquire(&run_dir.lock_path()) {
        Ok(lock) => {
            lock.release()?;
            Ok(not_running())
        }
        Err(SuperviseError::AlreadyRunning { .. }) => {
            match ControlChannel::send(&run_dir.control_path(), command) {
                Ok(()) => {}
                // The server exited after the lock check.
                Err(SuperviseError::NotRunning) => return Ok(not_running()),
                Err(e) => return Err(e).with_context(|| format!("Failed to send {command:?}")),
            }
            info!("sent {command:?}");
            println!(
                "{} Sent {} to supervisor",
                "→".cyan().bold(),
                char::from(command.as_byte())
            );
            Ok(Delivery::Sent)
        }
        Err(e) => Err(e).context("Failed to check supervisor lock"),
    }
}

fn not_running() -> Delivery {
    info!("process is not running.");
    println!("{} Supervisor is not running", "─".dimmed());
    Delivery::NotRunning
}
