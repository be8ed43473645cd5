//! Text input component.
//!
//! Values live in the controller, so an input here is stateless: [`edit`]
//! computes the new value for a key and [`render_input`] draws one. The
//! cursor always sits at the end of the value.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Position, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::ui::theme::theme;

/// Apply an editing key to `value`.
///
/// Returns the new value, or `None` if the key changes nothing.
pub fn edit(value: &str, key: KeyEvent) -> Option<String> {
    match (key.code, key.modifiers) {
        (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
            let mut next = value.to_string();
            next.push(c);
            Some(next)
        }
        (KeyCode::Backspace | KeyCode::Delete, _) => {
            let mut next = value.to_string();
            next.pop()?;
            Some(next)
        }
        // Ctrl+U - clear line
        (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
            (!value.is_empty()).then(String::new)
        }
        // Ctrl+W - delete the last word
        (KeyCode::Char('w'), KeyModifiers::CONTROL) => {
            if value.is_empty() {
                return None;
            }
            let trimmed = value.trim_end();
            let word_start = trimmed
                .rfind(|c: char| !c.is_alphanumeric())
                .map(|i| i + trimmed[i..].chars().next().map_or(1, char::len_utf8))
                .unwrap_or(0);
            Some(trimmed[..word_start].to_string())
        }
        _ => None,
    }
}

/// What an input shows for `value`.
pub fn display_value(value: &str, masked: bool) -> String {
    if masked {
        "•".repeat(value.chars().count())
    } else {
        value.to_string()
    }
}

/// Render a bordered input titled with `label`.
pub fn render_input(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    value: &str,
    masked: bool,
    focused: bool,
) {
    let t = theme();
    let display = display_value(value, masked);

    let (style, border_style, title_style) = if focused {
        (
            Style::default().fg(t.border_focused),
            Style::default().fg(t.border_focused),
            Style::default()
                .fg(t.border_focused)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        (
            Style::default().fg(t.input_fg),
            Style::default().fg(t.border),
            Style::default().fg(t.fg),
        )
    };

    let block = Block::default()
        .title(Span::styled(format!(" {} ", label), title_style))
        .borders(Borders::ALL)
        .border_style(border_style);

    let width = display.chars().count() as u16;
    frame.render_widget(Paragraph::new(display).style(style).block(block), area);

    if focused {
        let cursor_x = area.x + 1 + width;
        if cursor_x < area.x + area.width.saturating_sub(1) {
            frame.set_cursor_position(Position::new(cursor_x, area.y + 1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_character_input_appends() {
        assert_eq!(edit("Físic", key(KeyCode::Char('a'))), Some("Física".to_string()));
        let shifted = KeyEvent::new(KeyCode::Char('F'), KeyModifiers::SHIFT);
        assert_eq!(edit("", shifted), Some("F".to_string()));
    }

    #[test]
    fn test_backspace_removes_last_char() {
        assert_eq!(edit("Avaliação", key(KeyCode::Backspace)), Some("Avaliaçã".to_string()));
        assert_eq!(edit("", key(KeyCode::Backspace)), None);
    }

    #[test]
    fn test_ctrl_u_clear() {
        assert_eq!(edit("abc", ctrl('u')), Some(String::new()));
        assert_eq!(edit("", ctrl('u')), None);
    }

    #[test]
    fn test_ctrl_w_delete_word() {
        assert_eq!(edit("Cálculo Avançado", ctrl('w')), Some("Cálculo ".to_string()));
        assert_eq!(edit("Física ", ctrl('w')), Some(String::new()));
    }

    #[test]
    fn test_navigation_keys_change_nothing() {
        assert_eq!(edit("abc", key(KeyCode::Left)), None);
    }

    #[test]
    fn test_display_value_masked() {
        assert_eq!(display_value("senha", true), "•••••");
        assert_eq!(display_value("senha", false), "senha");
    }
}
