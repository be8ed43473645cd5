//! Modal dialog component.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::ui::theme::theme;

/// Calculate a centered rectangle within the given area.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

/// Render a yes/no confirmation over `area`.
pub fn render_confirm(frame: &mut Frame, area: Rect, title: &str, message: &str) {
    let t = theme();
    let width = 50u16.min(area.width.saturating_sub(4));
    let dialog = centered_rect(area, width, 6);

    frame.render_widget(Clear, dialog);
    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().fg(t.error).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(t.error));

    let text = vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled("[y] sim   [n] não", Style::default().fg(t.muted))),
    ];
    frame.render_widget(
        Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        dialog,
    );
}
