//! Role dashboards and the not-found page.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::App;
use crate::navigation::Page;
use crate::ui::theme::theme;

/// Draw the menu of `page`'s sub-pages with `selected` highlighted.
pub fn render_home(frame: &mut Frame, area: Rect, app: &App, page: Page, selected: usize) {
    let t = theme();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(3)])
        .split(area);

    let name = app
        .session()
        .user()
        .map(|user| user.display_name.as_str())
        .unwrap_or_default();
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::raw("Olá, "),
            Span::styled(name.to_string(), Style::default().fg(t.accent).add_modifier(Modifier::BOLD)),
        ])),
        chunks[0],
    );

    let items: Vec<ListItem> = page
        .children()
        .iter()
        .map(|child| ListItem::new(child.title()))
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .title(" Menu ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(t.border)),
        )
        .highlight_style(Style::default().fg(t.bg).bg(t.accent).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(Some(selected));
    frame.render_stateful_widget(list, chunks[1], &mut state);
}

pub fn render_not_found(frame: &mut Frame, area: Rect) {
    let t = theme();
    let text = vec![
        Line::from(Span::styled(
            "A página solicitada não existe ou você não tem acesso a ela.",
            Style::default().fg(t.error),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "[Enter] voltar ao painel",
            Style::default().fg(t.muted),
        )),
    ];
    frame.render_widget(Paragraph::new(text), area);
}
