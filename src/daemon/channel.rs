//! Control channel: a named pipe in the run directory.
//!
//! The server opens the FIFO read-write so a read never sees end-of-stream
//! when no client is attached. Clients open it write-only and non-blocking,
//! write one byte and exit.

use super::protocol::ControlCommand;
use crate::error::{Result, SuperviseError};
use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::stat::Mode;
use nix::unistd::mkfifo;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Backoff after a failed read so a broken descriptor cannot spin a core.
const READ_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Server side of the control pipe.
#[derive(Debug)]
pub struct ControlChannel {
    file: File,
}

impl ControlChannel {
    /// Create the FIFO if absent and open it for reading and writing.
    ///
    /// The descriptor is close-on-exec, so the supervised child never holds
    /// the pipe open.
    pub fn open(path: &Path) -> Result<Self> {
        match mkfifo(path, Mode::S_IRUSR | Mode::S_IWUSR) {
            Ok(()) | Err(Errno::EEXIST) => {}
            Err(e) => {
                return Err(SuperviseError::sys(
                    format!("Failed to create control pipe: {}", path.display()),
                    e,
                ))
            }
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| {
                SuperviseError::io(format!("Failed to open control pipe: {}", path.display()), e)
            })?;

        Ok(Self { file })
    }

    /// Blocking stream of raw command bytes, one per successful read.
    pub fn into_bytes(self) -> CommandBytes {
        CommandBytes { file: self.file }
    }

    /// Client side: deliver one command byte to whichever server holds the pipe.
    ///
    /// Never waits for a reader. If the server has already gone away the
    /// open fails with `ENXIO`, reported as [`SuperviseError::NotRunning`].
    pub fn send(path: &Path, command: ControlCommand) -> Result<()> {
        let mut pipe = OpenOptions::new()
            .write(true)
            .custom_flags(OFlag::O_NONBLOCK.bits())
            .open(path)
            .map_err(|e| {
                if e.raw_os_error() == Some(Errno::ENXIO as i32) {
                    SuperviseError::NotRunning
                } else {
                    SuperviseError::io(
                        format!("Failed to open control pipe: {}", path.display()),
                        e,
                    )
                }
            })?;

        pipe.write_all(&[command.as_byte()]).map_err(|e| {
            SuperviseError::io(format!("Failed to write control pipe: {}", path.display()), e)
        })
    }
}

/// Lazy sequence of bytes read from the control pipe.
///
/// Read errors are swallowed and the read is retried, so the iterator never
/// ends on its own.
pub struct CommandBytes {
    file: File,
}

impl Iterator for CommandBytes {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        let mut buf = [0u8; 1];
        loop {
            match self.file.read(&mut buf) {
                Ok(1) => return Some(buf[0]),
                Ok(_) => continue,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    debug!("control pipe read failed: {e}");
                    thread::sleep(READ_ERROR_BACKOFF);
                }
            }
        }
    }
}
