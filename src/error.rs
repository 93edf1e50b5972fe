//! Error taxonomy and process exit codes.

use std::path::PathBuf;
use thiserror::Error;

/// Normal termination.
pub const EXIT_OK: i32 = 0;

/// Another instance already holds the lock for this run directory.
pub const EXIT_RUNNING: i32 = 100;

/// Any other failure surfaced to the operator.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Debug, Error)]
pub enum SuperviseError {
    /// The singleton lock is held by another instance.
    #[error("process is running (lock held: {})", lock_path.display())]
    AlreadyRunning { lock_path: PathBuf },

    /// No instance holds the singleton lock.
    #[error("process is not running")]
    NotRunning,

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{context}: {source}")]
    Sys {
        context: String,
        #[source]
        source: nix::errno::Errno,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SuperviseError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn sys(context: impl Into<String>, source: nix::errno::Errno) -> Self {
        Self::Sys {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SuperviseError>;

/// Map an application error to the exit code the operator sees.
///
/// Lock contention anywhere in the chain yields [`EXIT_RUNNING`]; everything
/// else is a generic failure.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    let contended = err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<SuperviseError>(),
            Some(SuperviseError::AlreadyRunning { .. })
        )
    });

    if contended {
        EXIT_RUNNING
    } else {
        EXIT_FAILURE
    }
}
