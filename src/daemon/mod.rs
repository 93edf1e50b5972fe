mod channel;
mod detach;
mod engine;
mod events;
mod protocol;
mod signals;

pub use channel::{CommandBytes, ControlChannel};
pub use detach::detach;
pub use engine::{Engine, Step, SupervisorState};
pub use events::{forward, Event};
pub use protocol::ControlCommand;
pub use signals::{SignalKind, SignalRouter};
