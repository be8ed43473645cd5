//! Notification line rendering.
//!
//! The error message, when present, is shown first; a success message
//! follows on its own row until it expires.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::notification::{NotificationChannel, NotificationKind};
use crate::ui::theme::theme;

/// Color for a notification kind.
pub fn color(kind: NotificationKind) -> Color {
    let t = theme();
    match kind {
        NotificationKind::Error => t.error,
        NotificationKind::Success => t.success,
    }
}

/// Rows the notification area needs.
pub fn height(channel: &NotificationChannel) -> u16 {
    channel.iter().count() as u16
}

/// Render every live notification, one per row.
pub fn render_notifications(frame: &mut Frame, area: Rect, channel: &NotificationChannel) {
    let lines: Vec<Line> = channel
        .iter()
        .map(|notification| {
            let style = Style::default().fg(color(notification.kind));
            Line::from(vec![
                Span::styled(
                    format!("{} ", notification.kind.icon()),
                    style.add_modifier(Modifier::BOLD),
                ),
                Span::styled(notification.message.clone(), style),
            ])
        })
        .collect();
    if lines.is_empty() {
        return;
    }
    frame.render_widget(Paragraph::new(lines), area);
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_height_counts_live_messages() {
        let mut channel = NotificationChannel::new(Duration::from_secs(3));
        assert_eq!(height(&channel), 0);
        channel.error("Erro ao salvar curso");
        channel.success("Curso criado com sucesso!");
        assert_eq!(height(&channel), 2);
    }

    #[test]
    fn test_colors() {
        assert_eq!(color(NotificationKind::Error), Color::Red);
        assert_eq!(color(NotificationKind::Success), Color::Green);
    }
}
