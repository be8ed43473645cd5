//! Event handler implementation.
//!
//! Polls for terminal events and converts them to application events.

use std::time::Duration;

use crossterm::event::{
    self, Event as CrosstermEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};

use super::Event;

/// The tick rate for the event loop in milliseconds.
const TICK_RATE_MS: u64 = 100;

/// Handles application events by polling crossterm for terminal events.
pub struct EventHandler {
    /// The tick rate duration.
    tick_rate: Duration,
}

impl EventHandler {
    /// Create a new event handler with the default tick rate.
    pub fn new() -> Self {
        Self {
            tick_rate: Duration::from_millis(TICK_RATE_MS),
        }
    }

    /// Create a new event handler with a custom tick rate.
    pub fn with_tick_rate(tick_rate_ms: u64) -> Self {
        Self {
            tick_rate: Duration::from_millis(tick_rate_ms),
        }
    }

    /// Poll for the next event.
    ///
    /// Blocks until an event is available or the tick rate elapses.
    /// Returns `Event::Tick` if no event occurred within the tick rate.
    pub fn next(&self) -> std::io::Result<Event> {
        if event::poll(self.tick_rate)? {
            Ok(translate(event::read()?))
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a crossterm event to an application event.
///
/// Only key presses and left-button presses matter; everything else is a tick.
fn translate(event: CrosstermEvent) -> Event {
    match event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Event::Key(key),
        CrosstermEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            ..
        }) => Event::PointerDown { x: column, y: row },
        CrosstermEvent::Resize(width, height) => Event::Resize(width, height),
        _ => Event::Tick,
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyEventState, KeyModifiers};

    use super::*;

    fn mouse(kind: MouseEventKind) -> CrosstermEvent {
        CrosstermEvent::Mouse(MouseEvent {
            kind,
            column: 12,
            row: 4,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_event_handler_with_tick_rate() {
        let handler = EventHandler::with_tick_rate(50);
        assert_eq!(handler.tick_rate, Duration::from_millis(50));
        assert_eq!(EventHandler::default().tick_rate, Duration::from_millis(TICK_RATE_MS));
    }

    #[test]
    fn test_left_press_is_pointer_down() {
        assert_eq!(
            translate(mouse(MouseEventKind::Down(MouseButton::Left))),
            Event::PointerDown { x: 12, y: 4 }
        );
        assert_eq!(translate(mouse(MouseEventKind::Moved)), Event::Tick);
        assert_eq!(translate(mouse(MouseEventKind::Down(MouseButton::Right))), Event::Tick);
    }

    #[test]
    fn test_key_release_ignored() {
        let release = KeyEvent {
            code: KeyCode::Char('a'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(translate(CrosstermEvent::Key(release)), Event::Tick);

        let press = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        assert_eq!(translate(CrosstermEvent::Key(press)), Event::Key(press));
    }

    #[test]
    fn test_resize_passes_through() {
        assert_eq!(translate(CrosstermEvent::Resize(80, 24)), Event::Resize(80, 24));
    }
}
