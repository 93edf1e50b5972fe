//! Supervisor state machine.
//!
//! The engine is the only owner of [`SupervisorState`] and the child handle.
//! It consumes one [`Event`] at a time and runs the resulting side effects to
//! completion before looking at the next one.
//!
//! | State    | Event                       | Action              | Next     |
//! |----------|-----------------------------|---------------------|----------|
//! | Initial  | boot                        | spawn               | Running  |
//! | any      | `k`                         | kill group          | same     |
//! | any      | `x`, SIGINT, SIGTERM        | kill group          | Quitting |
//! | any      | `p`, `d`                    | kill group          | Paused   |
//! | Paused   | `u`                         | spawn               | Running  |
//! | Running  | child exited                | reap, spawn         | Running  |
//! | Quitting | child exited                | reap, exit 0        | -        |
//!
//! Respawn is immediate and unbounded: a child that dies instantly is
//! restarted as fast as the OS allows.

use super::events::Event;
use super::protocol::ControlCommand;
use super::signals::SignalKind;
use crate::error::EXIT_OK;
use crate::process::ChildControl;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Initial,
    Running,
    Paused,
    Quitting,
}

/// Outcome of handling a single event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Exit(i32),
}

pub struct Engine<C: ChildControl> {
    state: SupervisorState,
    child: C,
}

impl<C: ChildControl> Engine<C> {
    pub fn new(child: C) -> Self {
        Self {
            state: SupervisorState::Initial,
            child,
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    pub fn child(&self) -> &C {
        &self.child
    }

    /// Start the first child.
    pub fn boot(&mut self) {
        if self.state == SupervisorState::Initial {
            self.state = SupervisorState::Running;
            self.child.spawn();
        }
    }

    /// Boot, then handle events until a terminal transition.
    ///
    /// Returns the process exit code.
    pub fn run<I>(mut self, events: I) -> i32
    where
        I: IntoIterator<Item = Event>,
    {
        self.boot();

        for event in events {
            if let Step::Exit(code) = self.handle(event) {
                return code;
            }
        }

        warn!("all event sources closed, stopping child");
        self.child.kill();
        EXIT_OK
    }

    pub fn handle(&mut self, event: Event) -> Step {
        match event {
            Event::Command(byte) => match ControlCommand::from_byte(byte) {
                Some(command) => self.on_command(command),
                None => {
                    debug!("ignoring control byte {byte:#04x}");
                    Step::Continue
                }
            },
            Event::Signal(kind) => self.on_signal(kind),
        }
    }

    fn on_command(&mut self, command: ControlCommand) -> Step {
        debug!("command {command:?} in state {:?}", self.state);
        match command {
            ControlCommand::Kill => {
                self.child.kill();
                Step::Continue
            }
            ControlCommand::Quit => self.quit(),
            ControlCommand::Pause => {
                info!("pausing");
                self.state = SupervisorState::Paused;
                self.child.kill();
                Step::Continue
            }
            ControlCommand::Resume => {
                if self.state == SupervisorState::Paused {
                    info!("resuming");
                    self.state = SupervisorState::Running;
                    self.child.spawn();
                }
                Step::Continue
            }
        }
    }

    fn on_signal(&mut self, kind: SignalKind) -> Step {
        debug!("signal {kind:?} in state {:?}", self.state);
        if kind.is_termination() {
            return self.quit();
        }

        if !self.child.reap() {
            // Not our child's exit (e.g. a stop/continue notification).
            return Step::Continue;
        }

        match self.state {
            SupervisorState::Running => {
                self.child.spawn();
                Step::Continue
            }
            SupervisorState::Quitting => {
                info!("child reaped, exiting");
                Step::Exit(EXIT_OK)
            }
            SupervisorState::Initial | SupervisorState::Paused => Step::Continue,
        }
    }

    fn quit(&mut self) -> Step {
        info!("quitting");
        self.state = SupervisorState::Quitting;
        if self.child.kill() {
            Step::Continue
        } else {
            // Nothing alive to wait for.
            Step::Exit(EXIT_OK)
        }
    }
}
