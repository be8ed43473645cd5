//! Drawing and input routing for the whole terminal.
//!
//! The screen keeps only presentation state (focus, row selection, search
//! mode, where dropdowns were drawn). Everything else is read from the
//! controller, and every change goes back to it as an [`Intent`].

use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tracing::trace;

use super::components::{dropdown, help_bar, input, notification, Overlay};
use super::theme::theme;
use super::views::{
    auth::{self, LOGIN_FOCUS, REGISTER_FOCUS},
    dashboard,
    manage::{self, ManageView},
    records, Focusable, Placements,
};
use crate::api::types::Role;
use crate::app::App;
use crate::dropdown::DropdownId;
use crate::events::{classify, HintContext, KeyAction};
use crate::intent::Intent;
use crate::navigation::Page;
use crate::resource::ResourceKind;
use crate::session::CredentialField;

/// Presentation state carried between frames.
#[derive(Debug, Default)]
pub struct Screen {
    page: Page,
    form_open: bool,
    focus: usize,
    selected: usize,
    searching: bool,
    placements: Placements,
    overlays: Vec<(DropdownId, Overlay)>,
}

impl Screen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    /// The focused input, if the page has any.
    pub fn focused(&self, app: &App) -> Option<Focusable> {
        focusables(app).get(self.focus).copied()
    }

    /// Catch up with page and form changes made by the controller.
    fn sync(&mut self, app: &App) {
        let page = app.page();
        if page != self.page {
            trace!(from = %self.page, to = %page, "Screen reset for new page");
            self.page = page;
            self.selected = 0;
            self.searching = false;
            self.placements.clear();
            self.overlays.clear();
            self.focus = 0;
        }

        let form_open = page
            .managed_resource()
            .is_some_and(|kind| app.is_form_open(kind));
        if form_open != self.form_open {
            self.form_open = form_open;
            self.focus = 0;
        }
        if form_open {
            self.searching = false;
        }

        let rows = row_count(app);
        self.selected = self.selected.min(rows.saturating_sub(1));
    }

    /// Whether printable keys edit a text input right now.
    fn is_typing(&self, app: &App) -> bool {
        if let Some(kind) = app.page().managed_resource() {
            let snapshot = app.snapshot(kind);
            if snapshot.pending_removal.is_some() {
                return false;
            }
            if self.searching {
                return true;
            }
        }
        self.focused(app).is_some_and(|focus| focus.is_text())
    }

    fn move_focus(&mut self, app: &App, delta: isize) {
        let len = focusables(app).len();
        if len == 0 {
            return;
        }
        self.focus = (self.focus as isize + delta).rem_euclid(len as isize) as usize;
    }

    fn move_selection(&mut self, app: &App, delta: isize) {
        let rows = row_count(app);
        if rows == 0 {
            return;
        }
        self.selected = (self.selected as isize + delta).clamp(0, rows as isize - 1) as usize;
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Draw one frame. Returns where each dropdown now sits on screen,
    /// option list included.
    pub fn render(&mut self, frame: &mut Frame, app: &App) -> Vec<(DropdownId, Rect)> {
        self.sync(app);
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(5),
                Constraint::Length(notification::height(app.notifications())),
                Constraint::Length(1),
            ])
            .split(area);

        render_header(frame, chunks[0], app);

        let focus = self.focused(app);
        let page = app.page();
        self.placements = match page {
            Page::Login => auth::render_login(frame, chunks[1], app, focus),
            Page::Register(role) => auth::render_register(frame, chunks[1], app, role, focus),
            Page::StudentHome | Page::TeacherHome => {
                dashboard::render_home(frame, chunks[1], app, page, self.selected);
                Vec::new()
            }
            Page::RemedialEvaluations | Page::AllEvaluations => {
                records::render(frame, chunks[1], app, page, self.selected);
                Vec::new()
            }
            Page::NotFound => {
                dashboard::render_not_found(frame, chunks[1]);
                Vec::new()
            }
            _ => match page.managed_resource() {
                Some(kind) => {
                    let view = ManageView {
                        selected: self.selected,
                        searching: self.searching,
                        focus,
                    };
                    manage::render(frame, chunks[1], app, kind, view)
                }
                None => Vec::new(),
            },
        };

        notification::render_notifications(frame, chunks[2], app.notifications());
        help_bar::render_context_help(frame, chunks[3], self.hint_context(app));

        self.overlays.clear();
        let mut regions = Vec::with_capacity(self.placements.len());
        for &(id, field) in &self.placements {
            let mut region = field;
            if app.dropdowns().is_open(id) {
                let options = app.dropdown_options(id);
                let selected = selected_value(app, id);
                if let Some(overlay) = dropdown::render_overlay(
                    frame,
                    field,
                    area,
                    &options,
                    app.dropdowns().highlighted(id),
                    &selected,
                ) {
                    region = field.union(overlay.area);
                    self.overlays.push((id, overlay));
                }
            }
            regions.push((id, region));
        }
        regions
    }

    fn hint_context(&self, app: &App) -> HintContext {
        if self
            .placements
            .iter()
            .any(|(id, _)| app.dropdowns().is_open(*id))
        {
            return HintContext::Dropdown;
        }
        match app.page() {
            Page::Login => HintContext::Login,
            Page::Register(_) => HintContext::Register,
            Page::StudentHome | Page::TeacherHome => HintContext::Menu,
            Page::RemedialEvaluations | Page::AllEvaluations => HintContext::Records,
            Page::NotFound => HintContext::NotFound,
            page => match page.managed_resource().map(|kind| app.snapshot(kind)) {
                Some(snapshot) if snapshot.pending_removal.is_some() => HintContext::Confirm,
                Some(snapshot) if snapshot.form.is_some() => HintContext::Form,
                Some(_) if self.searching => HintContext::Search,
                _ => HintContext::List,
            },
        }
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Translate a key press into intents.
    pub fn on_key(&mut self, app: &App, key: KeyEvent) -> Vec<Intent> {
        self.sync(app);

        if let Some(id) = self.open_dropdown(app) {
            return self.dropdown_key(app, id, key);
        }

        let Some(action) = classify(key, self.is_typing(app)) else {
            return Vec::new();
        };
        match action {
            KeyAction::Quit => return vec![Intent::Quit],
            KeyAction::Logout if app.session().is_authenticated() => {
                return vec![Intent::Logout]
            }
            _ => {}
        }

        let page = app.page();
        match page {
            Page::Login => self.login_key(app, action),
            Page::Register(_) => self.register_key(app, action),
            Page::StudentHome | Page::TeacherHome => self.menu_key(app, page, action),
            Page::RemedialEvaluations | Page::AllEvaluations => self.records_key(app, action),
            Page::NotFound => match action {
                KeyAction::Submit | KeyAction::Back => vec![Intent::BackToDashboard],
                _ => Vec::new(),
            },
            _ => match page.managed_resource() {
                Some(kind) => self.manage_key(app, kind, action),
                None => Vec::new(),
            },
        }
    }

    /// Translate a left click into intents.
    ///
    /// The pointer-down always goes first so outside clicks close whatever
    /// is open.
    pub fn on_pointer(&mut self, app: &App, x: u16, y: u16) -> Vec<Intent> {
        self.sync(app);
        let mut intents = vec![Intent::PointerDown { x, y }];

        for &(id, overlay) in &self.overlays {
            if !app.dropdowns().is_open(id) {
                continue;
            }
            let options = app.dropdown_options(id);
            if let Some(index) = overlay.option_at(x, y, options.len()) {
                intents.push(Intent::SelectOption(id, options[index].0.clone()));
                return intents;
            }
        }

        let clicked = self
            .placements
            .iter()
            .find(|(_, field)| field.contains((x, y).into()))
            .map(|(id, _)| *id);
        if let Some(id) = clicked {
            if let Some(index) = focusables(app)
                .iter()
                .position(|focus| focus.dropdown() == Some(id))
            {
                self.focus = index;
            }
            intents.push(Intent::ToggleDropdown(id));
        }
        intents
    }

    fn open_dropdown(&self, app: &App) -> Option<DropdownId> {
        self.placements
            .iter()
            .map(|(id, _)| *id)
            .find(|id| app.dropdowns().is_open(*id))
    }

    fn dropdown_key(&mut self, app: &App, id: DropdownId, key: KeyEvent) -> Vec<Intent> {
        match classify(key, false) {
            Some(KeyAction::Quit) => vec![Intent::Quit],
            Some(KeyAction::Up) => vec![Intent::MoveHighlight(id, -1)],
            Some(KeyAction::Down) => vec![Intent::MoveHighlight(id, 1)],
            Some(KeyAction::Submit | KeyAction::Toggle) => {
                let options = app.dropdown_options(id);
                match options.get(app.dropdowns().highlighted(id)) {
                    Some((value, _)) => vec![Intent::SelectOption(id, value.clone())],
                    None => vec![Intent::ToggleDropdown(id)],
                }
            }
            Some(KeyAction::Back) => vec![Intent::ToggleDropdown(id)],
            Some(KeyAction::NextField) => {
                self.move_focus(app, 1);
                vec![Intent::ToggleDropdown(id)]
            }
            Some(KeyAction::PrevField) => {
                self.move_focus(app, -1);
                vec![Intent::ToggleDropdown(id)]
            }
            _ => Vec::new(),
        }
    }

    fn login_key(&mut self, app: &App, action: KeyAction) -> Vec<Intent> {
        let form = app.session().login_form();
        match action {
            KeyAction::Edit(key) => match self.focused(app) {
                Some(Focusable::Credential(field)) => {
                    let value = match field {
                        CredentialField::Password => &form.password,
                        _ => &form.name,
                    };
                    input::edit(value, key)
                        .map(|value| vec![Intent::SetLoginField(field, value)])
                        .unwrap_or_default()
                }
                _ => Vec::new(),
            },
            KeyAction::NextField | KeyAction::Down => {
                self.move_focus(app, 1);
                Vec::new()
            }
            KeyAction::PrevField | KeyAction::Up => {
                self.move_focus(app, -1);
                Vec::new()
            }
            KeyAction::Toggle if self.focused(app) == Some(Focusable::LoginRole) => {
                vec![Intent::ToggleDropdown(DropdownId::LoginRole)]
            }
            KeyAction::Submit => match self.focused(app) {
                Some(Focusable::LoginRole) => vec![Intent::ToggleDropdown(DropdownId::LoginRole)],
                _ => vec![Intent::Login],
            },
            KeyAction::RegisterStudent => vec![Intent::OpenRegister(Role::Student)],
            KeyAction::RegisterTeacher => vec![Intent::OpenRegister(Role::Teacher)],
            KeyAction::Back => vec![Intent::Quit],
            _ => Vec::new(),
        }
    }

    fn register_key(&mut self, app: &App, action: KeyAction) -> Vec<Intent> {
        let form = app.session().register_form();
        match action {
            KeyAction::Edit(key) => match self.focused(app) {
                Some(Focusable::Credential(field)) => {
                    let value = match field {
                        CredentialField::Name => &form.name,
                        CredentialField::Password => &form.password,
                        CredentialField::ConfirmPassword => &form.confirm_password,
                    };
                    input::edit(value, key)
                        .map(|value| vec![Intent::SetRegisterField(field, value)])
                        .unwrap_or_default()
                }
                _ => Vec::new(),
            },
            KeyAction::NextField | KeyAction::Down => {
                self.move_focus(app, 1);
                Vec::new()
            }
            KeyAction::PrevField | KeyAction::Up => {
                self.move_focus(app, -1);
                Vec::new()
            }
            KeyAction::Submit => vec![Intent::Register],
            KeyAction::Back => vec![Intent::BackToLogin],
            _ => Vec::new(),
        }
    }

    fn menu_key(&mut self, app: &App, page: Page, action: KeyAction) -> Vec<Intent> {
        let children = page.children();
        match action {
            KeyAction::Up => {
                self.move_selection(app, -1);
                Vec::new()
            }
            KeyAction::Down => {
                self.move_selection(app, 1);
                Vec::new()
            }
            KeyAction::Submit => children
                .get(self.selected)
                .map(|child| vec![Intent::Open(*child)])
                .unwrap_or_default(),
            KeyAction::Shortcut('q') => vec![Intent::Quit],
            KeyAction::Shortcut(c) => c
                .to_digit(10)
                .and_then(|digit| children.get((digit as usize).checked_sub(1)?))
                .map(|child| vec![Intent::Open(*child)])
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    fn records_key(&mut self, app: &App, action: KeyAction) -> Vec<Intent> {
        match action {
            KeyAction::Up => {
                self.move_selection(app, -1);
                Vec::new()
            }
            KeyAction::Down => {
                self.move_selection(app, 1);
                Vec::new()
            }
            KeyAction::Shortcut('r') => vec![Intent::Reload],
            KeyAction::Back => vec![Intent::BackToDashboard],
            _ => Vec::new(),
        }
    }

    fn manage_key(&mut self, app: &App, kind: ResourceKind, action: KeyAction) -> Vec<Intent> {
        let snapshot = app.snapshot(kind);

        if snapshot.pending_removal.is_some() {
            return match action {
                KeyAction::Shortcut('y') | KeyAction::Submit => {
                    vec![Intent::ConfirmRemove(kind, true)]
                }
                KeyAction::Shortcut('n') | KeyAction::Back => {
                    vec![Intent::ConfirmRemove(kind, false)]
                }
                _ => Vec::new(),
            };
        }

        if let Some(form) = &snapshot.form {
            let focus = self.focused(app);
            return match action {
                KeyAction::Edit(key) => match focus {
                    Some(Focusable::Field(_, field)) => form
                        .iter()
                        .find(|(candidate, _)| *candidate == field)
                        .and_then(|(_, value)| input::edit(value, key))
                        .map(|value| vec![Intent::SetField(kind, field, value)])
                        .unwrap_or_default(),
                    _ => Vec::new(),
                },
                KeyAction::NextField | KeyAction::Down => {
                    self.move_focus(app, 1);
                    Vec::new()
                }
                KeyAction::PrevField | KeyAction::Up => {
                    self.move_focus(app, -1);
                    Vec::new()
                }
                KeyAction::Submit | KeyAction::Toggle => {
                    match focus.and_then(|focus| focus.dropdown()) {
                        Some(id) => vec![Intent::ToggleDropdown(id)],
                        None if action == KeyAction::Submit => vec![Intent::Save(kind)],
                        None => Vec::new(),
                    }
                }
                KeyAction::Save => vec![Intent::Save(kind)],
                KeyAction::Back => vec![Intent::CancelForm(kind)],
                _ => Vec::new(),
            };
        }

        if self.searching {
            return match action {
                KeyAction::Edit(key) => input::edit(&snapshot.search_term, key)
                    .map(|term| vec![Intent::Search(kind, term)])
                    .unwrap_or_default(),
                KeyAction::Submit | KeyAction::Back => {
                    self.searching = false;
                    Vec::new()
                }
                _ => Vec::new(),
            };
        }

        let selected_id = snapshot.ids.get(self.selected).cloned();
        match action {
            KeyAction::Up => {
                self.move_selection(app, -1);
                Vec::new()
            }
            KeyAction::Down => {
                self.move_selection(app, 1);
                Vec::new()
            }
            KeyAction::Shortcut('n') => vec![Intent::BeginCreate(kind)],
            KeyAction::Shortcut('e') | KeyAction::Submit => selected_id
                .map(|id| vec![Intent::BeginEdit(kind, id)])
                .unwrap_or_default(),
            KeyAction::Shortcut('d') => selected_id
                .map(|id| vec![Intent::RequestRemove(kind, id)])
                .unwrap_or_default(),
            KeyAction::Shortcut('/') => {
                self.searching = true;
                Vec::new()
            }
            KeyAction::Shortcut('r') => vec![Intent::Refresh(kind)],
            KeyAction::Back => vec![Intent::BackToDashboard],
            _ => Vec::new(),
        }
    }
}

/// Inputs of the current page, in focus order.
fn focusables(app: &App) -> Vec<Focusable> {
    match app.page() {
        Page::Login => LOGIN_FOCUS.to_vec(),
        Page::Register(_) => REGISTER_FOCUS.to_vec(),
        page => page
            .managed_resource()
            .and_then(|kind| {
                let form = app.snapshot(kind).form?;
                Some(
                    form.into_iter()
                        .map(|(field, _)| Focusable::Field(kind, field))
                        .collect(),
                )
            })
            .unwrap_or_default(),
    }
}

/// Rows the current page lets the user move through.
fn row_count(app: &App) -> usize {
    let page = app.page();
    match page {
        Page::StudentHome | Page::TeacherHome => page.children().len(),
        Page::RemedialEvaluations | Page::AllEvaluations => records::row_count(app, page),
        _ => page
            .managed_resource()
            .map_or(0, |kind| app.snapshot(kind).ids.len()),
    }
}

/// Value currently committed for a dropdown.
fn selected_value(app: &App, id: DropdownId) -> String {
    match id {
        DropdownId::LoginRole => app.session().login_form().role.wire().to_string(),
        DropdownId::Field(kind, field) => app
            .snapshot(kind)
            .form
            .and_then(|form| {
                form.into_iter()
                    .find(|(candidate, _)| *candidate == field)
                    .map(|(_, value)| value)
            })
            .unwrap_or_default(),
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let t = theme();
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                " APTO ",
                Style::default().fg(t.bg).bg(t.accent).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(app.page().title(), Style::default().fg(t.fg).add_modifier(Modifier::BOLD)),
        ])),
        chunks[0],
    );

    if let Some(user) = app.session().user() {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!("{} ({}) ", user.display_name, user.role.label()),
                Style::default().fg(t.muted),
            )))
            .alignment(Alignment::Right),
            chunks[1],
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};
    use serde_json::json;

    use super::*;
    use crate::api::mock::MockTransport;
    use crate::api::{ApiClient, Method};
    use crate::app::Timing;
    use crate::resource::DraftField;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ch(c: char) -> KeyEvent {
        key(KeyCode::Char(c))
    }

    fn new_app(mock: &Arc<MockTransport>) -> App {
        App::new(ApiClient::new(mock.clone()), Timing::default())
    }

    /// Feed `key` through the screen and apply what it asks for.
    fn press(screen: &mut Screen, app: &mut App, key: KeyEvent) {
        for intent in screen.on_key(app, key) {
            app.update(intent);
        }
    }

    fn draw(screen: &mut Screen, app: &mut App) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let mut regions = Vec::new();
        terminal
            .draw(|frame| regions = screen.render(frame, app))
            .unwrap();
        app.update(Intent::DropdownRegions(regions));
        terminal
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    async fn teacher_on(mock: &Arc<MockTransport>, screen: &mut Screen, page: Page) -> App {
        mock.respond(
            Method::Post,
            "/api/professores/login",
            200,
            json!({"token": "jwt", "usuario": {"id": "u1", "nome": "Ana", "tipo": "professor"}}),
        );
        let mut app = new_app(mock);
        app.update(Intent::SetLoginField(CredentialField::Name, "Ana".into()));
        app.update(Intent::SetLoginField(CredentialField::Password, "abcd".into()));
        app.update(Intent::SelectOption(DropdownId::LoginRole, "professor".into()));
        app.update(Intent::Login);
        assert!(app.next_message().await);

        let index = Page::TeacherHome
            .children()
            .iter()
            .position(|child| *child == page)
            .unwrap();
        let digit = char::from_digit(index as u32 + 1, 10).unwrap();
        press(screen, &mut app, ch(digit));
        assert!(app.next_message().await);
        assert_eq!(app.page(), page);
        app
    }

    #[test]
    fn test_login_typing_goes_to_focused_field() {
        let mock = MockTransport::new();
        let mut app = new_app(&mock);
        let mut screen = Screen::new();

        press(&mut screen, &mut app, ch('A'));
        press(&mut screen, &mut app, ch('n'));
        press(&mut screen, &mut app, key(KeyCode::Tab));
        press(&mut screen, &mut app, ch('q'));
        press(&mut screen, &mut app, key(KeyCode::Backspace));
        press(&mut screen, &mut app, ch('x'));

        assert_eq!(app.session().login_form().name, "An");
        assert_eq!(app.session().login_form().password, "x");
        assert!(!app.should_quit());
    }

    #[test]
    fn test_login_role_dropdown_by_keyboard() {
        let mock = MockTransport::new();
        let mut app = new_app(&mock);
        let mut screen = Screen::new();
        draw(&mut screen, &mut app);

        press(&mut screen, &mut app, key(KeyCode::BackTab));
        assert_eq!(screen.focused(&app), Some(Focusable::LoginRole));
        press(&mut screen, &mut app, key(KeyCode::Enter));
        assert!(app.dropdowns().is_open(DropdownId::LoginRole));

        press(&mut screen, &mut app, key(KeyCode::Down));
        press(&mut screen, &mut app, key(KeyCode::Enter));
        assert!(!app.dropdowns().is_open(DropdownId::LoginRole));
        assert_eq!(app.session().login_form().role, Role::Teacher);
    }

    #[test]
    fn test_login_shortcuts() {
        let mock = MockTransport::new();
        let app = new_app(&mock);
        let mut screen = Screen::new();

        assert_eq!(
            screen.on_key(&app, key(KeyCode::F(3))),
            vec![Intent::OpenRegister(Role::Teacher)]
        );
        assert_eq!(screen.on_key(&app, key(KeyCode::Esc)), vec![Intent::Quit]);
        assert_eq!(
            screen.on_key(&app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            vec![Intent::Quit]
        );
        // Not signed in, so nothing to log out of.
        assert!(screen
            .on_key(&app, KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL))
            .is_empty());
    }

    #[test]
    fn test_click_on_role_field_toggles_it() {
        let mock = MockTransport::new();
        let mut app = new_app(&mock);
        let mut screen = Screen::new();
        draw(&mut screen, &mut app);

        let field = app.dropdowns().region(DropdownId::LoginRole).unwrap();
        let intents = screen.on_pointer(&app, field.x + 2, field.y + 1);
        assert_eq!(
            intents,
            vec![
                Intent::PointerDown {
                    x: field.x + 2,
                    y: field.y + 1
                },
                Intent::ToggleDropdown(DropdownId::LoginRole)
            ]
        );
        assert_eq!(screen.focused(&app), Some(Focusable::LoginRole));

        assert_eq!(
            screen.on_pointer(&app, 0, 0),
            vec![Intent::PointerDown { x: 0, y: 0 }]
        );
    }

    #[test]
    fn test_click_on_option_selects_it() {
        let mock = MockTransport::new();
        let mut app = new_app(&mock);
        let mut screen = Screen::new();
        draw(&mut screen, &mut app);
        app.update(Intent::ToggleDropdown(DropdownId::LoginRole));
        let terminal = draw(&mut screen, &mut app);
        assert!(buffer_text(&terminal).contains("Professor"));

        let (_, overlay) = screen.overlays[0];
        for intent in screen.on_pointer(&app, overlay.inner.x + 1, overlay.inner.y + 1) {
            app.update(intent);
        }

        assert_eq!(app.session().login_form().role, Role::Teacher);
        assert!(!app.dropdowns().is_open(DropdownId::LoginRole));
    }

    #[test]
    fn test_login_page_renders_form() {
        let mock = MockTransport::new();
        let mut app = new_app(&mock);
        let mut screen = Screen::new();
        let terminal = draw(&mut screen, &mut app);
        let text = buffer_text(&terminal);

        assert!(text.contains("Entrar"));
        assert!(text.contains("Tipo de conta"));
        assert!(text.contains("Aluno"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_manage_browse_and_search_keys() {
        let mock = MockTransport::new();
        mock.respond(
            Method::Get,
            "/api/cursos",
            200,
            json!([
                {"_id": "c1", "nome": "Física", "descricao": ""},
                {"_id": "c2", "nome": "Química", "descricao": ""}
            ]),
        );
        let mut screen = Screen::new();
        let mut app = teacher_on(&mock, &mut screen, Page::ManageCourses).await;
        let kind = ResourceKind::Course;

        press(&mut screen, &mut app, ch('j'));
        assert_eq!(screen.selected(), 1);
        assert_eq!(
            screen.on_key(&app, ch('d')),
            vec![Intent::RequestRemove(kind, "c2".into())]
        );
        assert_eq!(
            screen.on_key(&app, key(KeyCode::Enter)),
            vec![Intent::BeginEdit(kind, "c2".into())]
        );

        press(&mut screen, &mut app, ch('/'));
        assert!(screen.is_searching());
        assert_eq!(
            screen.on_key(&app, ch('F')),
            vec![Intent::Search(kind, "F".into())]
        );
        press(&mut screen, &mut app, key(KeyCode::Esc));
        assert!(!screen.is_searching());
        assert_eq!(screen.on_key(&app, key(KeyCode::Esc)), vec![Intent::BackToDashboard]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manage_form_keys() {
        let mock = MockTransport::new();
        mock.respond(Method::Get, "/api/cursos", 200, json!([]));
        let mut screen = Screen::new();
        let mut app = teacher_on(&mock, &mut screen, Page::ManageCourses).await;
        let kind = ResourceKind::Course;

        press(&mut screen, &mut app, ch('n'));
        assert!(app.is_form_open(kind));
        assert_eq!(screen.focused(&app), Some(Focusable::Field(kind, DraftField::Name)));

        press(&mut screen, &mut app, ch('n'));
        press(&mut screen, &mut app, ch('d'));
        let form = app.snapshot(kind).form.unwrap();
        assert_eq!(form[0], (DraftField::Name, "nd".to_string()));

        press(&mut screen, &mut app, key(KeyCode::Tab));
        press(&mut screen, &mut app, key(KeyCode::Tab));
        assert_eq!(
            screen.focused(&app),
            Some(Focusable::Field(kind, DraftField::RemedialCourse))
        );
        assert_eq!(
            screen.on_key(&app, key(KeyCode::Enter)),
            vec![Intent::ToggleDropdown(DropdownId::Field(kind, DraftField::RemedialCourse))]
        );
        assert_eq!(
            screen.on_key(&app, KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)),
            vec![Intent::Save(kind)]
        );

        press(&mut screen, &mut app, key(KeyCode::Esc));
        assert!(!app.is_form_open(kind));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_removal_takes_over_keys() {
        let mock = MockTransport::new();
        mock.respond(
            Method::Get,
            "/api/cursos",
            200,
            json!([{"_id": "c1", "nome": "Física", "descricao": ""}]),
        );
        let mut screen = Screen::new();
        let mut app = teacher_on(&mock, &mut screen, Page::ManageCourses).await;

        press(&mut screen, &mut app, ch('d'));
        let terminal = draw(&mut screen, &mut app);
        assert!(buffer_text(&terminal).contains("Confirmar exclusão"));

        assert_eq!(
            screen.on_key(&app, ch('n')),
            vec![Intent::ConfirmRemove(ResourceKind::Course, false)]
        );
        assert_eq!(
            screen.on_key(&app, ch('y')),
            vec![Intent::ConfirmRemove(ResourceKind::Course, true)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_from_any_page() {
        let mock = MockTransport::new();
        let mut screen = Screen::new();
        let mut app = teacher_on(&mock, &mut screen, Page::ManageStudents).await;

        press(
            &mut screen,
            &mut app,
            KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL),
        );
        assert_eq!(app.page(), Page::Login);
        assert!(!app.session().is_authenticated());
    }
}
