//! Dropdown rendering.
//!
//! Open/closed state lives in the controller's registry; this module only
//! draws the collapsed field and, when open, the option list as an overlay
//! below (or above) the field. The overlay geometry is returned so the
//! screen can map clicks back to options.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

use crate::ui::theme::theme;

/// Most options shown at once.
const MAX_VISIBLE_ITEMS: usize = 8;

/// Where an open option list was drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlay {
    /// Whole popup, borders included.
    pub area: Rect,
    /// Rows of options.
    pub inner: Rect,
    /// Index of the option on the first row.
    pub first: usize,
}

impl Overlay {
    /// Index of the option drawn at row `y`, if any.
    pub fn option_at(&self, x: u16, y: u16, len: usize) -> Option<usize> {
        let inside = x >= self.inner.x
            && x < self.inner.x + self.inner.width
            && y >= self.inner.y
            && y < self.inner.y + self.inner.height;
        if !inside {
            return None;
        }
        let index = self.first + usize::from(y - self.inner.y);
        (index < len).then_some(index)
    }
}

/// Label of the option whose value is `value`, if any.
pub fn selected_label<'a>(options: &'a [(String, String)], value: &str) -> Option<&'a str> {
    options
        .iter()
        .find(|(candidate, _)| candidate == value)
        .map(|(_, label)| label.as_str())
}

/// First option index to draw so `highlighted` stays visible.
fn first_visible(highlighted: usize, visible: usize) -> usize {
    (highlighted + 1).saturating_sub(visible)
}

/// Render the collapsed field.
pub fn render_field(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    display: Option<&str>,
    focused: bool,
    open: bool,
) {
    let t = theme();

    let (text_style, border_style, title_style) = if focused {
        (
            Style::default().fg(t.accent),
            Style::default().fg(t.border_focused),
            Style::default().fg(t.accent).add_modifier(Modifier::BOLD),
        )
    } else if display.is_none() {
        (
            Style::default().fg(t.input_placeholder),
            Style::default().fg(t.border),
            Style::default().fg(t.fg),
        )
    } else {
        (
            Style::default().fg(t.input_fg),
            Style::default().fg(t.border),
            Style::default().fg(t.fg),
        )
    };

    let indicator = if open { "▲" } else { "▼" };
    let text = format!("{} {}", display.unwrap_or("Selecione..."), indicator);

    let block = Block::default()
        .title(Span::styled(format!(" {} ", label), title_style))
        .borders(Borders::ALL)
        .border_style(border_style);

    frame.render_widget(Paragraph::new(text).style(text_style).block(block), area);
}

/// Render the option list of an open dropdown as an overlay.
///
/// `field` is where the collapsed field was drawn and `screen` bounds the
/// popup. Returns `None` when there is nothing to show.
pub fn render_overlay(
    frame: &mut Frame,
    field: Rect,
    screen: Rect,
    options: &[(String, String)],
    highlighted: usize,
    selected: &str,
) -> Option<Overlay> {
    let t = theme();

    let visible = options.len().clamp(1, MAX_VISIBLE_ITEMS);
    let list_height = visible as u16 + 2;

    let field_bottom = field.y + field.height;
    let space_below = (screen.y + screen.height).saturating_sub(field_bottom.saturating_sub(1));
    let space_above = field.y.saturating_sub(screen.y) + 1;

    let area = if space_below >= list_height || space_below >= space_above {
        Rect::new(
            field.x,
            field_bottom.saturating_sub(1),
            field.width,
            list_height.min(space_below),
        )
    } else {
        let height = list_height.min(space_above);
        Rect::new(field.x, (field.y + 1).saturating_sub(height), field.width, height)
    };
    if area.height < 3 {
        return None;
    }

    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(t.border_focused))
        .style(Style::default().bg(t.bg));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if options.is_empty() {
        frame.render_widget(
            Paragraph::new("Nenhuma opção disponível").style(Style::default().fg(t.muted)),
            inner,
        );
        return Some(Overlay {
            area,
            inner,
            first: 0,
        });
    }

    let rows = usize::from(inner.height);
    let first = first_visible(highlighted, rows);
    let items: Vec<ListItem> = options
        .iter()
        .enumerate()
        .skip(first)
        .take(rows)
        .map(|(index, (value, label))| {
            let style = if index == highlighted {
                Style::default()
                    .fg(t.bg)
                    .bg(t.accent)
                    .add_modifier(Modifier::BOLD)
            } else if value == selected {
                Style::default().fg(t.accent).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(t.fg)
            };
            let marker = if index == highlighted { "> " } else { "  " };
            ListItem::new(format!("{}{}", marker, label)).style(style)
        })
        .collect();

    frame.render_widget(List::new(items).style(Style::default().bg(t.bg)), inner);

    Some(Overlay { area, inner, first })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<(String, String)> {
        vec![
            ("c1".to_string(), "Física".to_string()),
            ("c2".to_string(), "Química".to_string()),
        ]
    }

    #[test]
    fn test_selected_label() {
        assert_eq!(selected_label(&options(), "c2"), Some("Química"));
        assert_eq!(selected_label(&options(), "c9"), None);
    }

    #[test]
    fn test_first_visible_keeps_highlight_on_screen() {
        assert_eq!(first_visible(0, 8), 0);
        assert_eq!(first_visible(7, 8), 0);
        assert_eq!(first_visible(8, 8), 1);
        assert_eq!(first_visible(20, 8), 13);
    }

    #[test]
    fn test_option_at_maps_rows() {
        let overlay = Overlay {
            area: Rect::new(0, 5, 20, 6),
            inner: Rect::new(1, 6, 18, 4),
            first: 3,
        };
        assert_eq!(overlay.option_at(2, 6, 10), Some(3));
        assert_eq!(overlay.option_at(2, 9, 10), Some(6));
        assert_eq!(overlay.option_at(2, 9, 5), None);
        assert_eq!(overlay.option_at(0, 6, 10), None);
        assert_eq!(overlay.option_at(2, 10, 10), None);
    }
}
