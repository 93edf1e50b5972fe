//! Singleton lock for a run directory
//!
//! One `fs2` advisory exclusive lock on `supervise.lock` decides which process
//! supervises a run directory. Client invocations use the same lock as the
//! rendezvous for "is an instance running": if they can take it, nobody is.
//!
//! Advisory locks are cooperative - only processes that check the lock are
//! excluded.

use crate::error::{Result, SuperviseError};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Exclusive lock held for the lifetime of the open file.
///
/// Dropping the handle (or exiting the process) releases the lock.
#[derive(Debug)]
pub struct LockHandle {
    file: File,
    path: PathBuf,
}

pub struct SingletonLock;

impl SingletonLock {
    /// Try to take the lock without blocking.
    ///
    /// Creates the lock file if it does not exist. The descriptor is opened
    /// close-on-exec so supervised children never inherit it.
    ///
    /// # Returns
    /// * `Ok(LockHandle)` - this process now holds the lock
    /// * `Err(SuperviseError::AlreadyRunning)` - another open file holds it
    /// * `Err(SuperviseError::Io)` - the lock file could not be opened or locked
    pub fn try_acquire(path: &Path) -> Result<LockHandle> {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .map_err(|e| {
                SuperviseError::io(format!("Failed to open lock file: {}", path.display()), e)
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(LockHandle {
                file,
                path: path.to_path_buf(),
            }),
            Err(e) if is_contended(&e) => Err(SuperviseError::AlreadyRunning {
                lock_path: path.to_path_buf(),
            }),
            Err(e) => Err(SuperviseError::io(
                format!("Failed to lock: {}", path.display()),
                e,
            )),
        }
    }
}

impl LockHandle {
    /// Drop the lock explicitly.
    pub fn release(self) -> Result<()> {
        FileExt::unlock(&self.file).map_err(|e| {
            SuperviseError::io(format!("Failed to unlock: {}", self.path.display()), e)
        })
    }
}

fn is_contended(err: &std::io::Error) -> bool {
    err.kind() == std::io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}
