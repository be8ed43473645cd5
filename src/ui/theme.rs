//! Theme and styling configuration.

use std::sync::OnceLock;

use ratatui::style::Color;

/// Color theme for the application.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Primary foreground color.
    pub fg: Color,
    /// Primary background color.
    pub bg: Color,
    /// Highlight color for selected items and focused titles.
    pub accent: Color,
    pub border: Color,
    pub border_focused: Color,
    pub input_fg: Color,
    pub input_placeholder: Color,
    pub muted: Color,
    pub error: Color,
    pub success: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: Color::White,
            bg: Color::Black,
            accent: Color::Cyan,
            border: Color::DarkGray,
            border_focused: Color::Yellow,
            input_fg: Color::White,
            input_placeholder: Color::DarkGray,
            muted: Color::DarkGray,
            error: Color::Red,
            success: Color::Green,
        }
    }
}

static THEME: OnceLock<Theme> = OnceLock::new();

/// The active theme.
pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}
