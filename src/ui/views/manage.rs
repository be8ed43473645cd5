//! Management pages: searchable list, create/edit form, delete confirmation.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use super::{format_date, render_muted, status_text, Focusable, Placements};
use crate::app::{App, ResourceSnapshot};
use crate::resource::{DraftField, ResourceKind};
use crate::ui::components::{dropdown, input, modal};
use crate::ui::theme::theme;

/// What the screen tracks on a management page.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManageView {
    pub selected: usize,
    pub searching: bool,
    pub focus: Option<Focusable>,
}

pub fn render(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    kind: ResourceKind,
    view: ManageView,
) -> Placements {
    let snapshot = app.snapshot(kind);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    input::render_input(
        frame,
        chunks[0],
        &format!("Buscar {}", kind.plural()),
        &snapshot.search_term,
        false,
        view.searching,
    );

    let mut placements = Vec::new();
    match &snapshot.form {
        Some(form) => {
            let panes = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(chunks[1]);
            render_list(frame, panes[0], app, kind, &snapshot, view.selected);
            placements = render_form(frame, panes[1], app, kind, &snapshot, form, view.focus);
        }
        None => render_list(frame, chunks[1], app, kind, &snapshot, view.selected),
    }

    if let Some(id) = &snapshot.pending_removal {
        let label = app
            .resources()
            .label_of(kind, id)
            .unwrap_or_else(|| id.clone());
        modal::render_confirm(
            frame,
            area,
            "Confirmar exclusão",
            &format!("Excluir {} \"{}\"?", kind.noun().to_lowercase(), label),
        );
    }

    placements
}

fn render_list(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    kind: ResourceKind,
    snapshot: &ResourceSnapshot,
    selected: usize,
) {
    let t = theme();
    let block = Block::default()
        .title(Span::styled(
            format!(" {} ({}) ", kind.plural(), snapshot.ids.len()),
            Style::default().fg(t.fg),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(t.border));

    if let Some(text) = status_text(snapshot.status, snapshot.ids.is_empty()) {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        render_muted(frame, inner, text);
        return;
    }

    let (header, widths) = columns(kind);
    let table = Table::new(rows(app, kind), widths)
        .header(Row::new(header).style(Style::default().fg(t.accent).add_modifier(Modifier::BOLD)))
        .block(block)
        .highlight_style(Style::default().fg(t.bg).bg(t.accent));

    let mut state = TableState::default().with_selected(Some(selected));
    frame.render_stateful_widget(table, area, &mut state);
}

fn columns(kind: ResourceKind) -> (Vec<&'static str>, Vec<Constraint>) {
    match kind {
        ResourceKind::Course => (
            vec!["Nome", "Descrição", "Curso de reforço"],
            vec![
                Constraint::Percentage(30),
                Constraint::Percentage(40),
                Constraint::Percentage(30),
            ],
        ),
        ResourceKind::Evaluation => (
            vec!["Nome", "Curso", "Data"],
            vec![
                Constraint::Percentage(45),
                Constraint::Percentage(40),
                Constraint::Length(12),
            ],
        ),
        ResourceKind::Student | ResourceKind::Teacher => {
            (vec!["Nome"], vec![Constraint::Percentage(100)])
        }
        ResourceKind::GradeRecord => (
            vec!["Avaliação", "Aluno", "Nota", "Observação"],
            vec![
                Constraint::Percentage(30),
                Constraint::Percentage(30),
                Constraint::Length(6),
                Constraint::Percentage(40),
            ],
        ),
    }
}

fn rows(app: &App, kind: ResourceKind) -> Vec<Row<'static>> {
    let resources = app.resources();
    let label = |kind: ResourceKind, id: &str| {
        resources
            .label_of(kind, id)
            .unwrap_or_else(|| id.to_string())
    };

    match kind {
        ResourceKind::Course => resources
            .courses
            .items()
            .iter()
            .map(|course| {
                let remedial = course
                    .remedial_course_id
                    .as_deref()
                    .map(|id| label(ResourceKind::Course, id))
                    .unwrap_or_else(|| "-".to_string());
                Row::new(vec![
                    Cell::from(course.name.clone()),
                    Cell::from(course.description.clone()),
                    Cell::from(remedial),
                ])
            })
            .collect(),
        ResourceKind::Evaluation => resources
            .evaluations
            .items()
            .iter()
            .map(|evaluation| {
                Row::new(vec![
                    Cell::from(evaluation.name.clone()),
                    Cell::from(label(ResourceKind::Course, &evaluation.course_id)),
                    Cell::from(format_date(evaluation.date)),
                ])
            })
            .collect(),
        ResourceKind::Student => resources
            .students
            .items()
            .iter()
            .map(|student| Row::new(vec![Cell::from(student.name.clone())]))
            .collect(),
        ResourceKind::Teacher => resources
            .teachers
            .items()
            .iter()
            .map(|teacher| Row::new(vec![Cell::from(teacher.name.clone())]))
            .collect(),
        ResourceKind::GradeRecord => resources
            .grade_records
            .items()
            .iter()
            .map(|record| {
                Row::new(vec![
                    Cell::from(label(ResourceKind::Evaluation, &record.evaluation_id)),
                    Cell::from(label(ResourceKind::Student, &record.student_id)),
                    Cell::from(format!("{:.1}", record.score)),
                    Cell::from(record.notes.clone()),
                ])
            })
            .collect(),
    }
}

fn render_form(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    kind: ResourceKind,
    snapshot: &ResourceSnapshot,
    form: &[(DraftField, String)],
    focus: Option<Focusable>,
) -> Placements {
    let t = theme();
    let title = if snapshot.editing_id.is_some() {
        format!(" Editar {} ", kind.noun())
    } else {
        format!(" {} {} ", kind.agree("Novo", "Nova"), kind.noun())
    };
    let block = Block::default()
        .title(Span::styled(
            title,
            Style::default().fg(t.accent).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(t.border_focused));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut constraints = vec![Constraint::Length(3); form.len()];
    constraints.push(Constraint::Length(1));
    constraints.push(Constraint::Min(0));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let mut placements = Vec::new();
    for (row, (field, value)) in chunks.iter().zip(form) {
        let focusable = Focusable::Field(kind, *field);
        let focused = focus == Some(focusable);
        match focusable.dropdown() {
            Some(id) => {
                let options = app.dropdown_options(id);
                dropdown::render_field(
                    frame,
                    *row,
                    field.label(),
                    dropdown::selected_label(&options, value),
                    focused,
                    app.dropdowns().is_open(id),
                );
                placements.push((id, *row));
            }
            None => {
                let label = match field {
                    DraftField::Date => "Data (aaaa-mm-dd)",
                    _ => field.label(),
                };
                input::render_input(frame, *row, label, value, field.is_secret(), focused);
            }
        }
    }

    if snapshot.busy {
        render_muted(frame, chunks[form.len()], "Salvando...");
    }

    placements
}
