//! Event plumbing between the blocking sources and the engine.

use super::signals::SignalKind;
use std::io;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use tracing::debug;

/// One input to the supervisor engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Raw byte read from the control pipe.
    Command(u8),
    Signal(SignalKind),
}

/// Drain a blocking source on its own thread, wrapping each item into an [`Event`].
///
/// Both sources share one queue, so the engine sees events in arrival order
/// regardless of which source produced them.
pub fn forward<I, F>(
    name: &str,
    source: I,
    events: Sender<Event>,
    wrap: F,
) -> io::Result<JoinHandle<()>>
where
    I: IntoIterator + Send + 'static,
    F: Fn(I::Item) -> Event + Send + 'static,
{
    let name = name.to_string();
    thread::Builder::new()
        .name(name.clone())
        .spawn(move || {
            for item in source {
                if events.send(wrap(item)).is_err() {
                    break;
                }
            }
            debug!("{name} source stopped");
        })
}
