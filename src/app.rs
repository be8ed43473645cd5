//! Main application state and message pump.
//!
//! This module implements The Elm Architecture (TEA) pattern: `App` is the
//! model, [`App::update`] applies one [`Intent`], and background results come
//! back through [`App::handle_message`]. Nothing here awaits a request inline;
//! every call goes through the [`TaskSpawner`] and is checked against the
//! ticket or epoch it captured before it touches state.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::api::types::{
    Course, Evaluation, GradeRecord, HistoryEntry, LoginResponse, RemedialEvaluation, Role,
    Student, Teacher,
};
use crate::api::{ApiClient, ApiError, BearerToken};
use crate::config::Settings;
use crate::dropdown::{DropdownId, DropdownRegistry};
use crate::error::{api_message, AppError, LOGIN_FAILED_MESSAGE, REGISTER_FAILED_MESSAGE};
use crate::intent::Intent;
use crate::navigation::{Navigator, Page};
use crate::notification::NotificationChannel;
use crate::records::{RecordsApplied, StudentRecords};
use crate::resource::{
    DraftField, Entity, FormChange, FormDraft, ListApplied, MutationApplied, Outcome,
    ResourceEvent, ResourceKind, ResourceStatus, Resources, SaveTarget,
};
use crate::session::{LoginApplied, RegisterApplied, SessionStore};
use crate::tasks::{ApiMessage, TaskSpawner};

/// Shown once an account was created.
pub const REGISTERED_MESSAGE: &str = "Cadastro realizado com sucesso!";

const REMEDIAL_FAILED_MESSAGE: &str = "Erro ao carregar avaliações com reforço";
const HISTORY_FAILED_MESSAGE: &str = "Erro ao carregar avaliações";

/// Label of the empty remedial course choice.
pub const NO_REMEDIAL_COURSE: &str = "Nenhum";

/// Delays the controller schedules on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Between a successful save/delete and the re-fetch.
    pub reconcile_delay: Duration,
    /// Between a successful registration and the move to login.
    pub register_redirect: Duration,
    pub success_notification: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for Timing {
    fn from(settings: &Settings) -> Self {
        Self {
            reconcile_delay: settings.reconcile_delay(),
            register_redirect: settings.register_redirect(),
            success_notification: settings.success_notification(),
        }
    }
}

/// What the renderer needs to know about one resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSnapshot {
    pub status: ResourceStatus,
    pub search_term: String,
    /// Row ids in list order.
    pub ids: Vec<String>,
    /// Values of the open form, in display order.
    pub form: Option<Vec<(DraftField, String)>>,
    pub editing_id: Option<String>,
    pub pending_removal: Option<String>,
    pub busy: bool,
}

/// Call a generic `App` method with the entity type behind a `ResourceKind`.
macro_rules! with_entity {
    ($kind:expr, $app:ident . $method:ident ( $($arg:expr),* )) => {
        match $kind {
            ResourceKind::Course => $app.$method::<Course>($($arg),*),
            ResourceKind::Evaluation => $app.$method::<Evaluation>($($arg),*),
            ResourceKind::Student => $app.$method::<Student>($($arg),*),
            ResourceKind::Teacher => $app.$method::<Teacher>($($arg),*),
            ResourceKind::GradeRecord => $app.$method::<GradeRecord>($($arg),*),
        }
    };
}

/// The main application struct that holds all state.
pub struct App {
    client: ApiClient,
    spawner: TaskSpawner,
    rx: mpsc::UnboundedReceiver<ApiMessage>,
    timing: Timing,
    session: SessionStore,
    navigator: Navigator,
    resources: Resources,
    records: StudentRecords,
    dropdowns: DropdownRegistry<DropdownId>,
    notifications: NotificationChannel,
    should_quit: bool,
}

impl App {
    /// Create the controller on the login page.
    ///
    /// Must be called inside a tokio runtime; background work is spawned on it.
    pub fn new(client: ApiClient, timing: Timing) -> Self {
        debug!(?timing, "Creating application");
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            client,
            spawner: TaskSpawner::new(tx),
            rx,
            timing,
            session: SessionStore::new(),
            navigator: Navigator::new(),
            resources: Resources::default(),
            records: StudentRecords::new(),
            dropdowns: DropdownRegistry::new(),
            notifications: NotificationChannel::new(timing.success_notification),
            should_quit: false,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn page(&self) -> Page {
        self.navigator.current()
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn records(&self) -> &StudentRecords {
        &self.records
    }

    pub fn dropdowns(&self) -> &DropdownRegistry<DropdownId> {
        &self.dropdowns
    }

    pub fn notifications(&self) -> &NotificationChannel {
        &self.notifications
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn is_form_open(&self, kind: ResourceKind) -> bool {
        with_entity!(kind, self.form_open())
    }

    fn form_open<E: Entity>(&self) -> bool {
        E::manager(&self.resources).is_form_open()
    }

    pub fn snapshot(&self, kind: ResourceKind) -> ResourceSnapshot {
        with_entity!(kind, self.snapshot_of())
    }

    fn snapshot_of<E: Entity>(&self) -> ResourceSnapshot {
        let manager = E::manager(&self.resources);
        ResourceSnapshot {
            status: manager.status(),
            search_term: manager.search_term().to_string(),
            ids: manager.items().iter().map(|item| item.id().to_string()).collect(),
            form: manager.draft().map(|draft| {
                <E::Draft as FormDraft>::FIELDS
                    .iter()
                    .map(|&field| (field, draft.get(field).unwrap_or_default().to_string()))
                    .collect()
            }),
            editing_id: manager.editing_id().map(str::to_string),
            pending_removal: manager.pending_removal().map(str::to_string),
            busy: manager.is_busy(),
        }
    }

    /// `(value, label)` pairs a dropdown offers.
    pub fn dropdown_options(&self, id: DropdownId) -> Vec<(String, String)> {
        match id {
            DropdownId::LoginRole => [Role::Student, Role::Teacher]
                .iter()
                .map(|role| (role.wire().to_string(), role.label().to_string()))
                .collect(),
            DropdownId::Field(ResourceKind::Course, DraftField::RemedialCourse) => {
                let mut options = vec![(String::new(), NO_REMEDIAL_COURSE.to_string())];
                options.extend(self.resources.courses.remedial_choices());
                options
            }
            DropdownId::Field(_, field) => field
                .choices()
                .map(|kind| self.resources.choices(kind))
                .unwrap_or_default(),
        }
    }

    // ========================================================================
    // Update
    // ========================================================================

    /// Apply one user intent.
    pub fn update(&mut self, intent: Intent) {
        trace!(?intent, "Intent");
        if intent.is_action() {
            self.notifications.clear_error();
        }

        match intent {
            Intent::SetLoginField(field, value) => self.session.set_login_field(field, value),
            Intent::Login => self.login(),
            Intent::Logout => self.logout(),
            Intent::SetRegisterField(field, value) => {
                self.session.set_register_field(field, value)
            }
            Intent::Register => self.register(),

            Intent::Navigate(page) => self.transition(|nav, role| nav.navigate(page, role)),
            Intent::OpenRegister(role) => {
                if self.session.login_form().is_loading() {
                    debug!("Registration not opened while signing in");
                    return;
                }
                self.transition(|nav, _| nav.open_register(role))
            }
            Intent::BackToLogin => self.transition(|nav, _| nav.back_to_login()),
            Intent::Open(page) => self.transition(|nav, role| match role {
                Some(role) => nav.open(page, role),
                None => nav.navigate(page, None),
            }),
            Intent::BackToDashboard => self.transition(|nav, role| nav.back_to_dashboard(role)),
            Intent::Reload => self.load_page(self.page()),

            Intent::Refresh(kind) => with_entity!(kind, self.fetch()),
            Intent::Search(kind, term) => with_entity!(kind, self.search(term)),
            Intent::BeginCreate(kind) => with_entity!(kind, self.begin_create()),
            Intent::BeginEdit(kind, id) => with_entity!(kind, self.begin_edit(id)),
            Intent::CancelForm(kind) => with_entity!(kind, self.cancel_form()),
            Intent::SetField(kind, field, value) => with_entity!(kind, self.set_field(field, value)),
            Intent::Save(kind) => with_entity!(kind, self.save()),
            Intent::RequestRemove(kind, id) => with_entity!(kind, self.request_remove(id)),
            Intent::ConfirmRemove(kind, accepted) => {
                with_entity!(kind, self.confirm_remove(accepted))
            }

            Intent::ToggleDropdown(id) => self.toggle_dropdown(id),
            Intent::SelectOption(id, value) => self.select_option(id, value),
            Intent::MoveHighlight(id, delta) => {
                let len = self.dropdown_options(id).len();
                self.dropdowns.move_highlight(id, delta, len);
            }
            Intent::PointerDown { x, y } => {
                let closed = self.dropdowns.pointer_down(x, y);
                if !closed.is_empty() {
                    trace!(?closed, "Closed dropdowns on outside click");
                }
            }
            Intent::DropdownRegions(regions) => {
                for (id, region) in regions {
                    self.dropdowns.set_region(id, region);
                }
            }

            Intent::DismissError => {}
            Intent::Quit => {
                info!("Quit requested");
                self.should_quit = true;
            }
        }
    }

    /// Expire success messages whose time is up.
    pub fn tick(&mut self) {
        self.notifications.tick();
    }

    // ========================================================================
    // Message pump
    // ========================================================================

    /// Apply every message already waiting. Returns how many were applied.
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(message) = self.rx.try_recv() {
            self.handle_message(message);
            applied += 1;
        }
        applied
    }

    /// Wait for the next background message and apply it.
    ///
    /// Returns false once no task can report anymore.
    pub async fn next_message(&mut self) -> bool {
        match self.rx.recv().await {
            Some(message) => {
                self.handle_message(message);
                true
            }
            None => false,
        }
    }

    /// Apply one background result.
    pub fn handle_message(&mut self, message: ApiMessage) {
        match message {
            ApiMessage::LoggedIn { epoch, result } => self.logged_in(epoch, result),
            ApiMessage::Registered { epoch, result } => self.registered(epoch, result),
            ApiMessage::RegisterRedirectDue { epoch } => self.register_redirect_due(epoch),
            ApiMessage::Resource(event) => match event {
                ResourceEvent::Course(outcome) => self.apply_outcome(outcome),
                ResourceEvent::Evaluation(outcome) => self.apply_outcome(outcome),
                ResourceEvent::Student(outcome) => self.apply_outcome(outcome),
                ResourceEvent::Teacher(outcome) => self.apply_outcome(outcome),
                ResourceEvent::GradeRecord(outcome) => self.apply_outcome(outcome),
            },
            ApiMessage::RemedialLoaded { epoch, result } => self.remedial_loaded(epoch, result),
            ApiMessage::HistoryLoaded { epoch, result } => self.history_loaded(epoch, result),
        }
    }

    // ========================================================================
    // Session
    // ========================================================================

    fn login(&mut self) {
        if self.page() != Page::Login {
            warn!(page = %self.page(), "Login outside the login page ignored");
            return;
        }
        match self.session.begin_login() {
            Err(e) => self.report(e),
            Ok(None) => debug!("Login already in progress"),
            Ok(Some((role, credentials))) => {
                self.dropdowns.close(DropdownId::LoginRole);
                self.spawner
                    .spawn_login(&self.client, self.session.epoch(), role, credentials);
            }
        }
    }

    /// Put a local failure on the notification line.
    fn report(&mut self, error: impl Into<AppError>) {
        let error = error.into();
        debug!(error = %error, "Reporting to the user");
        self.notifications.error(error.user_message());
    }

    fn logged_in(&mut self, epoch: u64, result: Result<LoginResponse, ApiError>) {
        match self.session.apply_login(epoch, result) {
            LoginApplied::Stale => {}
            LoginApplied::SignedIn(role) => {
                self.notifications.clear();
                self.transition(|nav, _| nav.enter_home(role));
            }
            LoginApplied::Failed(e) => {
                self.notifications.error(api_message(&e, LOGIN_FAILED_MESSAGE));
            }
        }
    }

    /// End the session: drop every cache, invalidate in-flight work, and
    /// return to the login page.
    fn logout(&mut self) {
        let from = self.page();
        self.session.logout();
        self.resources.reset_all();
        self.records.reset();
        self.dropdowns.clear();
        self.notifications.clear();
        self.navigator.logout();
        info!(from = %from, "Returned to login");
    }

    fn register(&mut self) {
        let Page::Register(role) = self.page() else {
            warn!(page = %self.page(), "Register outside a registration page ignored");
            return;
        };
        match self.session.begin_register(role) {
            Err(e) => self.report(e),
            Ok(None) => debug!("Registration already in progress"),
            Ok(Some((role, credentials))) => {
                self.spawner
                    .spawn_register(&self.client, self.session.epoch(), role, credentials);
            }
        }
    }

    fn registered(&mut self, epoch: u64, result: Result<(), ApiError>) {
        match self.session.apply_registered(epoch, result) {
            RegisterApplied::Stale => {}
            RegisterApplied::Registered => {
                self.notifications.success(REGISTERED_MESSAGE);
                self.spawner
                    .spawn_register_redirect(self.session.epoch(), self.timing.register_redirect);
            }
            RegisterApplied::Failed(e) => {
                self.notifications.error(api_message(&e, REGISTER_FAILED_MESSAGE));
            }
        }
    }

    fn register_redirect_due(&mut self, epoch: u64) {
        if !self.session.is_current(epoch) {
            return;
        }
        if matches!(self.page(), Page::Register(_)) {
            self.transition(|nav, _| nav.back_to_login());
        } else {
            debug!(page = %self.page(), "Left registration already, no redirect");
        }
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    fn transition(&mut self, step: impl FnOnce(&mut Navigator, Option<Role>) -> Page) {
        let from = self.page();
        let role = self.session.role();
        let to = step(&mut self.navigator, role);
        if from != to {
            self.page_changed(from, to);
        }
    }

    /// Unmount what `from` showed and `to` does not, then load `to`.
    fn page_changed(&mut self, from: Page, to: Page) {
        for &kind in from.mounted_resources() {
            if !to.mounts(kind) {
                self.resources.unmount(kind);
            }
        }
        if from.shows_student_records() && !to.shows_student_records() {
            self.records.unmount();
        }
        if matches!(from, Page::Register(_)) {
            self.session.clear_register_form();
        }
        self.dropdowns.clear();
        self.load_page(to);
    }

    fn load_page(&mut self, page: Page) {
        if let Some(kind) = page.managed_resource() {
            with_entity!(kind, self.fetch());
        }
        match page {
            Page::RemedialEvaluations => self.load_remedial(),
            Page::AllEvaluations => self.load_history(),
            _ => {}
        }
    }

    // ========================================================================
    // Resources
    // ========================================================================

    /// The token to use for `E`, if its page is on screen.
    fn resource_token<E: Entity>(&self) -> Option<BearerToken> {
        let page = self.page();
        if !page.mounts(E::KIND) {
            warn!(kind = %E::KIND, page = %page, "Resource is not on this page");
            return None;
        }
        self.session.token().cloned()
    }

    fn fetch<E: Entity>(&mut self) {
        let Some(token) = self.resource_token::<E>() else {
            return;
        };
        let ticket = E::manager_mut(&mut self.resources).begin_fetch();
        self.spawner
            .spawn_fetch::<E>(&self.client, token, ticket, String::new());
    }

    fn search<E: Entity>(&mut self, term: String) {
        let term = term.trim().to_string();
        if term.is_empty() {
            return self.fetch::<E>();
        }
        let Some(token) = self.resource_token::<E>() else {
            return;
        };
        let ticket = E::manager_mut(&mut self.resources).begin_search(&term);
        self.spawner.spawn_fetch::<E>(&self.client, token, ticket, term);
    }

    fn begin_create<E: Entity>(&mut self) {
        if self.resource_token::<E>().is_none() {
            return;
        }
        let change = E::manager_mut(&mut self.resources).begin_create();
        self.form_changed::<E>(change);
    }

    fn begin_edit<E: Entity>(&mut self, id: String) {
        if self.resource_token::<E>().is_none() {
            return;
        }
        let change = E::manager_mut(&mut self.resources).begin_edit(&id);
        if change == FormChange::Missing {
            warn!(kind = %E::KIND, %id, "Row to edit is not loaded");
        }
        self.form_changed::<E>(change);
    }

    fn form_changed<E: Entity>(&mut self, change: FormChange) {
        match change {
            FormChange::Opened => {
                for &kind in E::KIND.joins() {
                    with_entity!(kind, self.fetch());
                }
            }
            FormChange::Closed => self.close_form_dropdowns(E::KIND),
            FormChange::Missing => {}
            FormChange::Busy => debug!(kind = %E::KIND, "Form locked while a request is in flight"),
        }
    }

    fn close_form_dropdowns(&mut self, kind: ResourceKind) {
        self.dropdowns
            .close_where(|id| matches!(id, DropdownId::Field(owner, _) if *owner == kind));
    }

    fn cancel_form<E: Entity>(&mut self) {
        if E::manager_mut(&mut self.resources).cancel_form() {
            self.close_form_dropdowns(E::KIND);
        }
    }

    fn set_field<E: Entity>(&mut self, field: DraftField, value: String) {
        if !E::manager_mut(&mut self.resources).set_field(field, value) {
            debug!(kind = %E::KIND, ?field, "Field not set, no such field or no open form");
        }
    }

    fn save<E: Entity>(&mut self) {
        let Some(token) = self.resource_token::<E>() else {
            return;
        };
        match E::manager_mut(&mut self.resources).begin_save() {
            Err(e) => {
                debug!(kind = %E::KIND, error = %e, "Draft rejected before sending");
                self.report(e);
            }
            Ok(None) => debug!(kind = %E::KIND, "Nothing to save"),
            Ok(Some(mutation)) => {
                info!(kind = %E::KIND, target = ?mutation.target, "Saving");
                self.close_form_dropdowns(E::KIND);
                self.spawner.spawn_save::<E>(&self.client, token, mutation);
            }
        }
    }

    fn request_remove<E: Entity>(&mut self, id: String) {
        if self.resource_token::<E>().is_none() {
            return;
        }
        if !E::manager_mut(&mut self.resources).request_removal(&id) {
            debug!(kind = %E::KIND, %id, "Removal not requested");
        }
    }

    fn confirm_remove<E: Entity>(&mut self, accepted: bool) {
        let Some(token) = self.resource_token::<E>() else {
            return;
        };
        if let Some(removal) = E::manager_mut(&mut self.resources).confirm_removal(accepted) {
            info!(kind = %E::KIND, id = %removal.id, "Removing");
            self.spawner.spawn_remove::<E>(&self.client, token, removal);
        }
    }

    fn apply_outcome<E: Entity>(&mut self, outcome: Outcome<E>) {
        if !self.session.is_authenticated() {
            debug!(kind = %E::KIND, "Dropping result that arrived after logout");
            return;
        }
        let kind = E::KIND;

        match outcome {
            Outcome::Listed { ticket, result } => {
                if let ListApplied::Failed(e) = E::manager_mut(&mut self.resources).apply_list(ticket, result) {
                    self.notifications
                        .error(api_message(&e, &kind.load_failed_message()));
                }
            }
            Outcome::Saved {
                ticket,
                target,
                result,
            } => match E::manager_mut(&mut self.resources).apply_saved(ticket, result) {
                MutationApplied::Succeeded => {
                    let message = match target {
                        SaveTarget::Create => kind.created_message(),
                        SaveTarget::Update(_) => kind.updated_message(),
                    };
                    self.notifications.success(message);
                    self.spawner
                        .spawn_reconcile::<E>(ticket, self.timing.reconcile_delay);
                }
                MutationApplied::Failed(e) => {
                    self.notifications
                        .error(api_message(&e, &kind.save_failed_message()));
                }
                MutationApplied::Stale => {}
            },
            Outcome::Removed { ticket, id, result } => {
                match E::manager_mut(&mut self.resources).apply_removed(ticket, result) {
                    MutationApplied::Succeeded => {
                        info!(kind = %kind, %id, "Removed");
                        self.notifications.success(kind.removed_message());
                        self.spawner
                            .spawn_reconcile::<E>(ticket, self.timing.reconcile_delay);
                    }
                    MutationApplied::Failed(e) => {
                        self.notifications
                            .error(api_message(&e, &kind.remove_failed_message()));
                    }
                    MutationApplied::Stale => {}
                }
            }
            Outcome::ReconcileDue { ticket } => {
                if E::manager(&self.resources).is_current(ticket) {
                    debug!(kind = %kind, "Reconciling with the server");
                    self.fetch::<E>();
                } else {
                    debug!(kind = %kind, "Reconcile timer outlived its page");
                }
            }
        }
    }

    // ========================================================================
    // Student records
    // ========================================================================

    /// Token and id of the signed-in student.
    fn student_context(&self) -> Option<(BearerToken, String)> {
        let session = self.session.session()?;
        if session.role() != Role::Student {
            return None;
        }
        Some((session.token().clone(), session.user().id.clone()))
    }

    fn load_remedial(&mut self) {
        let Some((token, student_id)) = self.student_context() else {
            return;
        };
        let epoch = self.records.begin_remedial();
        self.spawner
            .spawn_remedial(&self.client, token, epoch, student_id);
    }

    fn load_history(&mut self) {
        let Some((token, student_id)) = self.student_context() else {
            return;
        };
        let epoch = self.records.begin_history();
        self.spawner
            .spawn_history(&self.client, token, epoch, student_id);
    }

    fn remedial_loaded(&mut self, epoch: u64, result: Result<Vec<RemedialEvaluation>, ApiError>) {
        if !self.session.is_authenticated() {
            return;
        }
        if let RecordsApplied::Failed(e) = self.records.apply_remedial(epoch, result) {
            self.notifications
                .error(api_message(&e, REMEDIAL_FAILED_MESSAGE));
        }
    }

    fn history_loaded(&mut self, epoch: u64, result: Result<Vec<HistoryEntry>, ApiError>) {
        if !self.session.is_authenticated() {
            return;
        }
        if let RecordsApplied::Failed(e) = self.records.apply_history(epoch, result) {
            self.notifications
                .error(api_message(&e, HISTORY_FAILED_MESSAGE));
        }
    }

    // ========================================================================
    // Dropdowns
    // ========================================================================

    fn toggle_dropdown(&mut self, id: DropdownId) {
        let available = match id {
            DropdownId::LoginRole => self.page() == Page::Login,
            DropdownId::Field(kind, field) => {
                field.choices().is_some()
                    && self.page().mounts(kind)
                    && self.is_form_open(kind)
            }
        };
        if !available {
            debug!(?id, "Dropdown not available here");
            return;
        }
        let open = self.dropdowns.toggle(id);
        trace!(?id, open, "Dropdown toggled");
    }

    /// Commit the chosen value and close the dropdown in one step.
    fn select_option(&mut self, id: DropdownId, value: String) {
        match id {
            DropdownId::LoginRole => match Role::from_wire(&value) {
                Some(role) => self.session.set_login_role(role),
                None => warn!(%value, "Unknown account type"),
            },
            DropdownId::Field(kind, field) => with_entity!(kind, self.set_field(field, value)),
        }
        self.dropdowns.close(id);
    }
}
