//! OS signal routing.
//!
//! SIGCHLD, SIGINT and SIGTERM are blocked and collected synchronously with
//! `sigwait`. The mask must be installed on the main thread before any other
//! thread exists so every thread inherits it; otherwise the kernel may deliver
//! a signal to a thread that is not waiting for it.

use crate::error::{Result, SuperviseError};
use nix::sys::signal::{SigSet, Signal};
use tracing::warn;

/// Signal events the engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    ChildExited,
    Interrupt,
    Terminate,
}

impl SignalKind {
    pub fn from_signal(signal: Signal) -> Option<Self> {
        match signal {
            Signal::SIGCHLD => Some(Self::ChildExited),
            Signal::SIGINT => Some(Self::Interrupt),
            Signal::SIGTERM => Some(Self::Terminate),
            _ => None,
        }
    }

    /// Interrupt and terminate both ask the supervisor to quit.
    pub fn is_termination(self) -> bool {
        matches!(self, Self::Interrupt | Self::Terminate)
    }
}

/// Blocking source of [`SignalKind`] events.
pub struct SignalRouter {
    mask: SigSet,
}

impl SignalRouter {
    /// Block the routed signals for the calling thread and its future threads.
    pub fn install() -> Result<Self> {
        let mut mask = SigSet::empty();
        mask.add(Signal::SIGCHLD);
        mask.add(Signal::SIGINT);
        mask.add(Signal::SIGTERM);

        mask.thread_block()
            .map_err(|e| SuperviseError::sys("Failed to block signals", e))?;

        Ok(Self { mask })
    }
}

impl Iterator for SignalRouter {
    type Item = SignalKind;

    fn next(&mut self) -> Option<SignalKind> {
        loop {
            match self.mask.wait() {
                Ok(signal) => {
                    if let Some(kind) = SignalKind::from_signal(signal) {
                        return Some(kind);
                    }
                }
                Err(e) => warn!("sigwait failed: {e}"),
            }
        }
    }
}
