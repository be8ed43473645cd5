//! Event handling for the application.
//!
//! Terminal input is polled into [`Event`]s; keys are then classified into
//! [`KeyAction`]s that the screen turns into intents.

mod handler;
mod keys;

use crossterm::event::KeyEvent;

pub use handler::EventHandler;
pub use keys::{classify, hints, HintContext, KeyAction};

/// Events the main loop reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    /// Left button pressed at `(x, y)` in terminal cells.
    PointerDown { x: u16, y: u16 },
    Resize(u16, u16),
    /// Nothing happened within the tick rate.
    Tick,
}
