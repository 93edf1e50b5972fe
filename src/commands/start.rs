//! Start command - become the supervising server for a run directory

use crate::config::Config;
use crate::daemon::{self, ControlChannel, Engine, Event, SignalRouter};
use crate::error::{SuperviseError, EXIT_OK};
use crate::fs::{RunDir, SingletonLock, StatusStore};
use crate::process::ProcessManager;
use anyhow::{Context, Result};
use std::sync::mpsc;
use tracing::{info, warn};

/// Execute the start action.
///
/// Returns the exit code of the supervisor once the engine reaches a terminal
/// state, or `EXIT_OK` right away for the foreground phase of a daemonized
/// start.
pub fn execute(config: &Config) -> Result<i32> {
    let run_dir = RunDir::new(&config.run_dir);
    run_dir.create()?;

    if config.should_detach() {
        return detach(config, &run_dir);
    }

    let _lock = acquire_lock(&run_dir)?;

    let status = StatusStore::new(&run_dir);
    if let Err(e) = status.write_supervisor_pid(std::process::id()) {
        warn!("{e:#}");
    }

    // Must happen before any thread or child exists.
    let signals = SignalRouter::install().context("Failed to install signal router")?;

    let control = ControlChannel::open(&run_dir.control_path())
        .context("Failed to open control channel")?;

    let (tx, rx) = mpsc::channel();
    daemon::forward("control", control.into_bytes(), tx.clone(), Event::Command)
        .context("Failed to start control reader")?;
    daemon::forward("signals", signals, tx, Event::Signal)
        .context("Failed to start signal router")?;

    let working_dir = std::env::current_dir().context("Failed to get current directory")?;
    let manager = ProcessManager::new(&config.command_line, &working_dir, status);

    info!(
        "supervising `{}` in {}",
        config.command_line,
        run_dir.root().display()
    );

    Ok(Engine::new(manager).run(rx))
}

fn acquire_lock(run_dir: &RunDir) -> Result<crate::fs::LockHandle> {
    match SingletonLock::try_acquire(&run_dir.lock_path()) {
        Ok(lock) => Ok(lock),
        Err(e @ SuperviseError::AlreadyRunning { .. }) => {
            warn!("process is running.");
            Err(e.into())
        }
        Err(e) => Err(e).context("Failed to acquire supervisor lock"),
    }
}

/// Phase 1 of a daemonized start: check the lock, hand it over, detach.
fn detach(config: &Config, run_dir: &RunDir) -> Result<i32> {
    // Release before launching so the background copy can take it.
    let lock = acquire_lock(run_dir)?;
    lock.release()?;

    let pid = daemon::detach(config, run_dir)?;
    info!("supervisor detached as {pid}");
    Ok(EXIT_OK)
}
