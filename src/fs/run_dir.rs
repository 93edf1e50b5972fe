use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const LOCK_FILE: &str = "supervise.lock";
pub const CONTROL_PIPE: &str = "control";
pub const PID_FILE: &str = "supervise.pid";
pub const STATUS_FILE: &str = "status";
pub const LOG_FILE: &str = "supervise.log";

/// Layout of a supervisor run directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDir {
    root: PathBuf,
}

impl RunDir {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Create the directory (and parents) if missing.
    pub fn create(&self) -> Result<()> {
        fs::create_dir_all(&self.root).with_context(|| {
            format!("Failed to create run directory: {}", self.root.display())
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn lock_path(&self) -> PathBuf {
        self.root.join(LOCK_FILE)
    }

    pub fn control_path(&self) -> PathBuf {
        self.root.join(CONTROL_PIPE)
    }

    pub fn pid_path(&self) -> PathBuf {
        self.root.join(PID_FILE)
    }

    pub fn status_path(&self) -> PathBuf {
        self.root.join(STATUS_FILE)
    }

    pub fn log_path(&self) -> PathBuf {
        self.root.join(LOG_FILE)
    }
}
