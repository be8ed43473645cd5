//! The signed-in student's remedial list and grade history.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use super::{format_date, format_score, render_muted, status_text};
use crate::api::types::{EvaluationRef, HistoryEntry, RemedialEvaluation};
use crate::app::App;
use crate::navigation::Page;
use crate::ui::theme::theme;

/// Rows of the page's table, used to clamp the selection.
pub fn row_count(app: &App, page: Page) -> usize {
    match page {
        Page::RemedialEvaluations => app.records().remedial().len(),
        Page::AllEvaluations => app.records().history().len(),
        _ => 0,
    }
}

pub fn render(frame: &mut Frame, area: Rect, app: &App, page: Page, selected: usize) {
    let records = app.records();
    let (status, rows, header, widths) = match page {
        Page::RemedialEvaluations => (
            records.remedial_status(),
            records.remedial().iter().map(remedial_row).collect::<Vec<_>>(),
            vec!["Avaliação", "Curso", "Nota", "Data"],
            vec![
                Constraint::Percentage(40),
                Constraint::Percentage(35),
                Constraint::Length(6),
                Constraint::Length(12),
            ],
        ),
        _ => (
            records.history_status(),
            records.history().iter().map(history_row).collect::<Vec<_>>(),
            vec!["Avaliação", "Curso", "Nota", "Observação", "Data"],
            vec![
                Constraint::Percentage(30),
                Constraint::Percentage(25),
                Constraint::Length(6),
                Constraint::Percentage(30),
                Constraint::Length(12),
            ],
        ),
    };

    let t = theme();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(t.border));

    if let Some(text) = status_text(status, rows.is_empty()) {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        render_muted(frame, inner, text);
        return;
    }

    let table = Table::new(rows, widths)
        .header(Row::new(header).style(Style::default().fg(t.accent).add_modifier(Modifier::BOLD)))
        .block(block)
        .highlight_style(Style::default().fg(t.bg).bg(t.accent));

    let mut state = TableState::default().with_selected(Some(selected));
    frame.render_stateful_widget(table, area, &mut state);
}

fn evaluation_name(evaluation: &EvaluationRef) -> String {
    evaluation
        .name
        .clone()
        .unwrap_or_else(|| evaluation.id.clone())
}

fn remedial_row(entry: &RemedialEvaluation) -> Row<'static> {
    let course = entry
        .course_name
        .clone()
        .or_else(|| entry.evaluation.course_name.clone())
        .unwrap_or_else(|| "-".to_string());
    Row::new(vec![
        Cell::from(evaluation_name(&entry.evaluation)),
        Cell::from(course),
        Cell::from(format_score(entry.score)),
        Cell::from(format_date(entry.date())),
    ])
}

fn history_row(entry: &HistoryEntry) -> Row<'static> {
    let course = entry
        .evaluation
        .course_name
        .clone()
        .unwrap_or_else(|| "-".to_string());
    Row::new(vec![
        Cell::from(evaluation_name(&entry.evaluation)),
        Cell::from(course),
        Cell::from(format_score(entry.score)),
        Cell::from(entry.notes.clone().unwrap_or_default()),
        Cell::from(format_date(entry.date())),
    ])
}
