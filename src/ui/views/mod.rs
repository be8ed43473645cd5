//! Application views (screens).
//!
//! Each view draws one page from the controller's state and returns the
//! dropdown fields it drew, so the screen can overlay open option lists
//! and record their regions.

pub mod auth;
pub mod dashboard;
pub mod manage;
pub mod records;

use chrono::NaiveDate;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::dropdown::DropdownId;
use crate::resource::{DraftField, ResourceKind, ResourceStatus};
use crate::session::CredentialField;
use crate::ui::theme::theme;

/// Dropdown fields a view drew this frame.
pub type Placements = Vec<(DropdownId, Rect)>;

/// Something that can hold keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focusable {
    Credential(CredentialField),
    LoginRole,
    Field(ResourceKind, DraftField),
}

impl Focusable {
    /// The dropdown behind this focusable, if it is one.
    pub fn dropdown(&self) -> Option<DropdownId> {
        match *self {
            Focusable::LoginRole => Some(DropdownId::LoginRole),
            Focusable::Field(kind, field) if field.choices().is_some() => {
                Some(DropdownId::Field(kind, field))
            }
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        self.dropdown().is_none()
    }
}

/// `dd/mm/YYYY`, or a dash when unknown.
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// One decimal, or a dash when unknown.
pub fn format_score(score: Option<f64>) -> String {
    score
        .map(|s| format!("{:.1}", s))
        .unwrap_or_else(|| "-".to_string())
}

/// Text shown instead of rows when there are none to show.
///
/// Rows already on screen stay visible while a reload runs or after it fails.
pub fn status_text(status: ResourceStatus, empty: bool) -> Option<&'static str> {
    if !empty {
        return None;
    }
    Some(match status {
        ResourceStatus::Loading => "Carregando...",
        ResourceStatus::Errored => "Não foi possível carregar os dados.",
        ResourceStatus::Loaded | ResourceStatus::Idle => "Nenhum registro encontrado.",
    })
}

/// Draw a titled box centered in `area` with `rows` input rows of height 3
/// and one status line below them.
///
/// Returns the input rows and the status line.
pub fn form_box(frame: &mut Frame, area: Rect, title: &str, rows: usize) -> (Vec<Rect>, Rect) {
    let t = theme();
    let height = rows as u16 * 3 + 3;
    let dialog = crate::ui::components::modal::centered_rect(area, 56, height);

    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().fg(t.accent).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(t.border));
    let inner = block.inner(dialog);
    frame.render_widget(block, dialog);

    let mut constraints = vec![Constraint::Length(3); rows];
    constraints.push(Constraint::Length(1));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let fields = chunks[..rows].to_vec();
    (fields, chunks[rows])
}

/// Render a muted one-line message.
pub fn render_muted(frame: &mut Frame, area: Rect, text: &str) {
    frame.render_widget(
        Paragraph::new(text.to_string()).style(Style::default().fg(theme().muted)),
        area,
    );
}
