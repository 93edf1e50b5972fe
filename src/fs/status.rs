//! Status files for external inspection.
//!
//! `status` holds the current child's pid and is rewritten on every spawn;
//! `supervise.pid` holds the supervisor's own pid. Both are newline-terminated
//! decimal.

use super::run_dir::RunDir;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct StatusStore {
    status_path: PathBuf,
    pid_path: PathBuf,
}

impl StatusStore {
    pub fn new(run_dir: &RunDir) -> Self {
        Self {
            status_path: run_dir.status_path(),
            pid_path: run_dir.pid_path(),
        }
    }

    pub fn write_child_pid(&self, pid: u32) -> Result<()> {
        write_pid(&self.status_path, pid)
    }

    pub fn write_supervisor_pid(&self, pid: u32) -> Result<()> {
        write_pid(&self.pid_path, pid)
    }

    pub fn read_child_pid(&self) -> Option<u32> {
        read_pid(&self.status_path)
    }

    pub fn read_supervisor_pid(&self) -> Option<u32> {
        read_pid(&self.pid_path)
    }
}

/// Write through a sibling temp file and rename, so readers never see a
/// truncated file.
fn write_pid(path: &Path, pid: u32) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, format!("{pid}\n"))
        .with_context(|| format!("Failed to write pid file: {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace pid file: {}", path.display()))
}

/// `None` if the file is missing or does not hold a pid.
fn read_pid(path: &Path) -> Option<u32> {
    fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse::<u32>().ok())
}
