//! Status command - report supervisor and child process ids

use crate::error::SuperviseError;
use crate::fs::{RunDir, SingletonLock, StatusStore};
use crate::process::is_process_alive;
use anyhow::{Context, Result};
use colored::Colorize;

/// Snapshot of a run directory as seen from outside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub running: bool,
    pub supervisor_pid: Option<u32>,
    pub child_pid: Option<u32>,
    pub child_alive: bool,
}

/// Inspect `run_dir` without touching the control pipe.
pub fn collect(run_dir: &RunDir) -> Result<StatusReport> {
    let running = match SingletonLock::try_acquire(&run_dir.lock_path()) {
        Ok(lock) => {
            lock.release()?;
            false
        }
        Err(SuperviseError::AlreadyRunning { .. }) => true,
        Err(e) => return Err(e).context("Failed to check supervisor lock"),
    };

    let store = StatusStore::new(run_dir);
    let child_pid = store.read_child_pid();

    Ok(StatusReport {
        running,
        supervisor_pid: store.read_supervisor_pid(),
        child_pid,
        child_alive: running && child_pid.is_some_and(is_process_alive),
    })
}

pub fn execute(run_dir: &RunDir) -> Result<StatusReport> {
    run_dir.create()?;
    let report = collect(run_dir)?;

    if !report.running {
        println!("{} Supervisor is not running", "─".dimmed());
        return Ok(report);
    }

    let supervisor = report
        .supervisor_pid
        .map_or_else(|| "unknown".to_string(), |pid| pid.to_string());
    println!("{} Supervisor running (pid {supervisor})", "✓".green().bold());

    match report.child_pid {
        Some(pid) if report.child_alive => println!("  child {pid} running"),
        Some(pid) => println!("  child {pid} {}", "not running".yellow()),
        None => println!("  no child started"),
    }

    Ok(report)
}
