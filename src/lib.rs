//! Minimal process supervisor.
//!
//! One server instance per run directory keeps a single child command alive:
//! it starts the child in its own process group, restarts it whenever it
//! exits, and takes single-byte commands (kill, quit, pause, resume) from
//! client invocations through a named pipe.
//!
//! There is no crash-loop protection. A child that exits immediately is
//! respawned immediately, forever.

pub mod commands;
pub mod config;
pub mod daemon;
pub mod error;
pub mod fs;
pub mod process;

pub use config::{Action, Config};
pub use error::{SuperviseError, EXIT_FAILURE, EXIT_OK, EXIT_RUNNING};
