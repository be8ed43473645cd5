//! Login and registration forms.

use ratatui::{layout::Rect, Frame};

use super::{form_box, render_muted, Focusable, Placements};
use crate::api::types::Role;
use crate::app::App;
use crate::dropdown::DropdownId;
use crate::navigation::Page;
use crate::session::CredentialField;
use crate::ui::components::{dropdown, input};

/// Focus order of the login form.
pub const LOGIN_FOCUS: [Focusable; 3] = [
    Focusable::Credential(CredentialField::Name),
    Focusable::Credential(CredentialField::Password),
    Focusable::LoginRole,
];

/// Focus order of the registration form.
pub const REGISTER_FOCUS: [Focusable; 3] = [
    Focusable::Credential(CredentialField::Name),
    Focusable::Credential(CredentialField::Password),
    Focusable::Credential(CredentialField::ConfirmPassword),
];

pub fn render_login(frame: &mut Frame, area: Rect, app: &App, focus: Option<Focusable>) -> Placements {
    let form = app.session().login_form();
    let (rows, status) = form_box(frame, area, Page::Login.title(), LOGIN_FOCUS.len());

    input::render_input(
        frame,
        rows[0],
        CredentialField::Name.label(),
        &form.name,
        false,
        focus == Some(LOGIN_FOCUS[0]),
    );
    input::render_input(
        frame,
        rows[1],
        CredentialField::Password.label(),
        &form.password,
        true,
        focus == Some(LOGIN_FOCUS[1]),
    );
    dropdown::render_field(
        frame,
        rows[2],
        "Tipo de conta",
        Some(form.role.label()),
        focus == Some(Focusable::LoginRole),
        app.dropdowns().is_open(DropdownId::LoginRole),
    );

    let line = if form.is_loading() {
        "Entrando..."
    } else {
        "Não tem conta? [F2] aluno  [F3] professor"
    };
    render_muted(frame, status, line);

    vec![(DropdownId::LoginRole, rows[2])]
}

pub fn render_register(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    role: Role,
    focus: Option<Focusable>,
) -> Placements {
    let form = app.session().register_form();
    let (rows, status) = form_box(frame, area, Page::Register(role).title(), REGISTER_FOCUS.len());

    let values = [&form.name, &form.password, &form.confirm_password];
    for ((row, focusable), value) in rows.iter().zip(REGISTER_FOCUS).zip(values) {
        if let Focusable::Credential(field) = focusable {
            input::render_input(
                frame,
                *row,
                field.label(),
                value,
                field != CredentialField::Name,
                focus == Some(focusable),
            );
        }
    }

    if form.is_loading() {
        render_muted(frame, status, "Cadastrando...");
    }

    Vec::new()
}
