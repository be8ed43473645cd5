//! The per-entity CRUD state machine.
//!
//! A `ResourceManager` never performs I/O. Each operation moves the state
//! and, when a request is needed, hands back what to send together with a
//! [`Ticket`]. The caller runs the request and feeds the result back through
//! the matching `apply_*` method, which drops it if the ticket went stale.

use tracing::{debug, warn};

use super::{Entity, FormDraft, ResourceKind, ResourceStatus, ValidationError};
use crate::api::ApiError;
use crate::api::types::Course;

/// Proof of which incarnation of a manager started a request.
///
/// The epoch moves on unmount and on reset, so results for a screen or
/// session that no longer exists fail [`ResourceManager::is_current`].
/// `request` numbers list requests; only the latest one may fill the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub kind: ResourceKind,
    pub epoch: u64,
    pub request: u64,
}

/// Whether a save creates or updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveTarget {
    Create,
    Update(String),
}

/// A validated save, ready to send.
#[derive(Debug)]
pub struct Mutation<P> {
    pub ticket: Ticket,
    pub target: SaveTarget,
    pub payload: P,
}

/// A confirmed delete, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub ticket: Ticket,
    pub id: String,
}

/// Effect of `begin_create` / `begin_edit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormChange {
    Opened,
    /// A draft was already open, so the call closed it.
    Closed,
    /// The row to edit is not in the cache.
    Missing,
    /// A save or delete is in flight; the form stays as it is.
    Busy,
}

/// Effect of feeding a list result back.
#[derive(Debug)]
pub enum ListApplied {
    Stale,
    Loaded(usize),
    Failed(ApiError),
}

/// Effect of feeding a save or delete result back.
#[derive(Debug)]
pub enum MutationApplied {
    Stale,
    Succeeded,
    Failed(ApiError),
}

/// CRUD state for one entity type.
#[derive(Debug)]
pub struct ResourceManager<E: Entity> {
    /// Rows in server order.
    items: Vec<E>,
    status: ResourceStatus,
    search_term: String,
    /// Open create/edit form.
    draft: Option<E::Draft>,
    /// Row the open draft was seeded from.
    editing_id: Option<String>,
    /// Row awaiting delete confirmation.
    pending_removal: Option<String>,
    /// A save or delete is in flight.
    busy: bool,
    epoch: u64,
    /// Latest list request handed out.
    request: u64,
}

impl<E: Entity> Default for ResourceManager<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> ResourceManager<E> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            status: ResourceStatus::Idle,
            search_term: String::new(),
            draft: None,
            editing_id: None,
            pending_removal: None,
            busy: false,
            epoch: 0,
            request: 0,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        E::KIND
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn status(&self) -> ResourceStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == ResourceStatus::Loading
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn draft(&self) -> Option<&E::Draft> {
        self.draft.as_ref()
    }

    pub fn is_form_open(&self) -> bool {
        self.draft.is_some()
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.editing_id.as_deref()
    }

    pub fn pending_removal(&self) -> Option<&str> {
        self.pending_removal.as_deref()
    }

    /// Whether save/delete controls should be disabled.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn find(&self, id: &str) -> Option<&E> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// `(id, label)` pairs in server order.
    pub fn choices(&self) -> Vec<(String, String)> {
        self.items
            .iter()
            .map(|item| (item.id().to_string(), item.label()))
            .collect()
    }

    pub fn ticket(&self) -> Ticket {
        Ticket {
            kind: E::KIND,
            epoch: self.epoch,
            request: self.request,
        }
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.kind == E::KIND && ticket.epoch == self.epoch
    }

    // ========================================================================
    // Listing
    // ========================================================================

    /// Start a full list fetch. Clears any search term.
    pub fn begin_fetch(&mut self) -> Ticket {
        self.begin_search("")
    }

    /// Start a name search. An empty term behaves like [`begin_fetch`](Self::begin_fetch).
    pub fn begin_search(&mut self, term: &str) -> Ticket {
        self.search_term = term.to_string();
        self.status = ResourceStatus::Loading;
        self.request += 1;
        self.ticket()
    }

    /// Replace the cache with a list result.
    pub fn apply_list(&mut self, ticket: Ticket, result: Result<Vec<E>, ApiError>) -> ListApplied {
        if !self.is_current(ticket) || ticket.request != self.request {
            debug!(kind = %E::KIND, request = ticket.request, "Dropping stale list result");
            return ListApplied::Stale;
        }

        match result {
            Ok(items) => self.replace_items(items),
            Err(ApiError::NotFound(_)) => self.replace_items(Vec::new()),
            Err(e) => {
                warn!(kind = %E::KIND, error = %e, "List fetch failed");
                self.status = ResourceStatus::Errored;
                ListApplied::Failed(e)
            }
        }
    }

    fn replace_items(&mut self, items: Vec<E>) -> ListApplied {
        let count = items.len();
        self.items = items;
        self.status = ResourceStatus::Loaded;
        debug!(kind = %E::KIND, count, "Cache replaced");
        ListApplied::Loaded(count)
    }

    // ========================================================================
    // Drafts
    // ========================================================================

    /// Open an empty draft, or close the open one.
    pub fn begin_create(&mut self) -> FormChange {
        if self.busy {
            return FormChange::Busy;
        }
        if self.close_if_open() {
            return FormChange::Closed;
        }
        self.draft = Some(E::Draft::default());
        self.editing_id = None;
        FormChange::Opened
    }

    /// Open a draft seeded from row `id`, or close the open one.
    pub fn begin_edit(&mut self, id: &str) -> FormChange {
        if self.busy {
            return FormChange::Busy;
        }
        if self.close_if_open() {
            return FormChange::Closed;
        }
        match self.find(id) {
            Some(item) => {
                self.draft = Some(item.to_draft());
                self.editing_id = Some(id.to_string());
                FormChange::Opened
            }
            None => FormChange::Missing,
        }
    }

    fn close_if_open(&mut self) -> bool {
        if self.draft.is_some() {
            self.close_draft();
            true
        } else {
            false
        }
    }

    fn close_draft(&mut self) {
        self.draft = None;
        self.editing_id = None;
    }

    /// Discard the open draft. Refused while a save or delete is in flight.
    pub fn cancel_form(&mut self) -> bool {
        if self.busy {
            debug!(kind = %E::KIND, "Cancel ignored while a request is in flight");
            return false;
        }
        self.close_draft();
        true
    }

    /// Write one field of the open draft.
    pub fn set_field(&mut self, field: super::DraftField, value: String) -> bool {
        match self.draft.as_mut() {
            Some(draft) => draft.set(field, value),
            None => false,
        }
    }

    /// Validate the open draft and mark a save as in flight.
    ///
    /// Returns `Ok(None)` when there is nothing to send: no draft is open or
    /// a previous save/delete has not finished.
    pub fn begin_save(&mut self) -> Result<Option<Mutation<E::Payload>>, ValidationError> {
        if self.busy {
            debug!(kind = %E::KIND, "Save ignored while a request is in flight");
            return Ok(None);
        }
        let Some(draft) = self.draft.as_ref() else {
            return Ok(None);
        };

        let payload = E::payload(draft, self.editing_id.as_deref())?;
        let target = match &self.editing_id {
            Some(id) => SaveTarget::Update(id.clone()),
            None => SaveTarget::Create,
        };

        self.busy = true;
        Ok(Some(Mutation {
            ticket: self.ticket(),
            target,
            payload,
        }))
    }

    /// Feed a save result back. Success closes the draft.
    pub fn apply_saved(&mut self, ticket: Ticket, result: Result<(), ApiError>) -> MutationApplied {
        if !self.is_current(ticket) {
            debug!(kind = %E::KIND, "Dropping stale save result");
            return MutationApplied::Stale;
        }
        self.busy = false;

        match result {
            Ok(()) => {
                self.close_draft();
                MutationApplied::Succeeded
            }
            Err(e) => {
                warn!(kind = %E::KIND, error = %e, "Save failed");
                MutationApplied::Failed(e)
            }
        }
    }

    // ========================================================================
    // Removal
    // ========================================================================

    /// Ask for confirmation before deleting row `id`.
    pub fn request_removal(&mut self, id: &str) -> bool {
        if self.busy || self.find(id).is_none() {
            return false;
        }
        self.pending_removal = Some(id.to_string());
        true
    }

    /// Answer the pending confirmation. Declining sends nothing.
    pub fn confirm_removal(&mut self, accepted: bool) -> Option<Removal> {
        let id = self.pending_removal.take()?;
        if !accepted || self.busy {
            debug!(kind = %E::KIND, %id, "Removal declined");
            return None;
        }
        self.busy = true;
        Some(Removal {
            ticket: self.ticket(),
            id,
        })
    }

    /// Feed a delete result back. The cache is only updated by re-fetching.
    pub fn apply_removed(&mut self, ticket: Ticket, result: Result<(), ApiError>) -> MutationApplied {
        if !self.is_current(ticket) {
            debug!(kind = %E::KIND, "Dropping stale delete result");
            return MutationApplied::Stale;
        }
        self.busy = false;

        match result {
            Ok(()) => MutationApplied::Succeeded,
            Err(e) => {
                warn!(kind = %E::KIND, error = %e, "Delete failed");
                MutationApplied::Failed(e)
            }
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Detach from the screen: close forms and invalidate in-flight work.
    pub fn unmount(&mut self) {
        self.epoch += 1;
        self.close_draft();
        self.pending_removal = None;
        self.busy = false;
        if self.status == ResourceStatus::Loading {
            self.status = ResourceStatus::Idle;
        }
    }

    /// Forget everything; used when the session ends.
    pub fn reset(&mut self) {
        self.unmount();
        self.items.clear();
        self.search_term.clear();
        self.status = ResourceStatus::Idle;
    }
}

impl ResourceManager<Course> {
    /// Courses that may serve as remedial target for the open draft.
    pub fn remedial_choices(&self) -> Vec<(String, String)> {
        let editing = self.editing_id.as_deref();
        self.items
            .iter()
            .filter(|course| Some(course.id.as_str()) != editing)
            .map(|course| (course.id.clone(), course.name.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{CourseDraft, DraftField};

    fn course(id: &str, name: &str) -> Course {
        Course {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            remedial_course_id: None,
        }
    }

    fn loaded(items: Vec<Course>) -> ResourceManager<Course> {
        let mut manager = ResourceManager::<Course>::new();
        let ticket = manager.begin_fetch();
        manager.apply_list(ticket, Ok(items));
        manager
    }

    #[test]
    fn test_fetch_replaces_items_wholesale() {
        let mut manager = loaded(vec![course("c1", "Física"), course("c2", "Química")]);
        assert_eq!(manager.items().len(), 2);

        let ticket = manager.begin_fetch();
        assert!(manager.is_loading());
        let applied = manager.apply_list(ticket, Ok(vec![course("c3", "Biologia")]));

        assert!(matches!(applied, ListApplied::Loaded(1)));
        assert_eq!(manager.items()[0].id, "c3");
        assert_eq!(manager.status(), ResourceStatus::Loaded);
    }

    #[test]
    fn test_not_found_is_loaded_and_empty() {
        let mut manager = loaded(vec![course("c1", "Física")]);
        let ticket = manager.begin_fetch();
        manager.apply_list(ticket, Err(ApiError::NotFound("/api/cursos".into())));

        assert!(manager.items().is_empty());
        assert_eq!(manager.status(), ResourceStatus::Loaded);
    }

    #[test]
    fn test_failed_fetch_keeps_items_and_errors() {
        let mut manager = loaded(vec![course("c1", "Física")]);
        let ticket = manager.begin_fetch();
        let applied = manager.apply_list(
            ticket,
            Err(ApiError::ServerError {
                status: 500,
                message: None,
            }),
        );

        assert!(matches!(applied, ListApplied::Failed(_)));
        assert_eq!(manager.items().len(), 1);
        assert_eq!(manager.status(), ResourceStatus::Errored);
    }

    #[test]
    fn test_stale_ticket_is_dropped() {
        let mut manager = ResourceManager::<Course>::new();
        let ticket = manager.begin_fetch();
        manager.unmount();

        let applied = manager.apply_list(ticket, Ok(vec![course("c1", "Física")]));
        assert!(matches!(applied, ListApplied::Stale));
        assert!(manager.items().is_empty());
    }

    #[test]
    fn test_out_of_order_search_results_keep_latest_term() {
        let mut manager = loaded(vec![]);
        let broad = manager.begin_search("F");
        let narrow = manager.begin_search("Fís");

        let applied = manager.apply_list(narrow, Ok(vec![course("c1", "Física")]));
        assert!(matches!(applied, ListApplied::Loaded(1)));

        let late = manager.apply_list(
            broad,
            Ok(vec![course("c1", "Física"), course("c2", "Filosofia")]),
        );
        assert!(matches!(late, ListApplied::Stale));
        assert_eq!(manager.search_term(), "Fís");
        assert_eq!(manager.items().len(), 1);
        assert_eq!(manager.status(), ResourceStatus::Loaded);
    }

    #[test]
    fn test_fetch_supersedes_pending_search() {
        let mut manager = loaded(vec![]);
        let search = manager.begin_search("Quí");
        let fetch = manager.begin_fetch();

        assert!(matches!(
            manager.apply_list(search, Ok(vec![course("c2", "Química")])),
            ListApplied::Stale
        ));
        assert!(manager.is_loading());
        assert!(matches!(
            manager.apply_list(fetch, Ok(vec![course("c1", "Física"), course("c2", "Química")])),
            ListApplied::Loaded(2)
        ));
    }

    #[test]
    fn test_mutation_ticket_survives_later_fetch() {
        let mut manager = loaded(vec![course("c1", "Física")]);
        manager.request_removal("c1");
        let removal = manager.confirm_removal(true).unwrap();
        manager.begin_fetch();

        assert!(manager.is_current(removal.ticket));
        assert!(matches!(
            manager.apply_removed(removal.ticket, Ok(())),
            MutationApplied::Succeeded
        ));
    }

    #[test]
    fn test_begin_create_twice_cancels() {
        let mut manager = ResourceManager::<Course>::new();
        assert_eq!(manager.begin_create(), FormChange::Opened);
        assert_eq!(manager.draft(), Some(&CourseDraft::default()));
        assert_eq!(manager.editing_id(), None);

        assert_eq!(manager.begin_create(), FormChange::Closed);
        assert!(!manager.is_form_open());
    }

    #[test]
    fn test_begin_edit_seeds_draft() {
        let mut manager = loaded(vec![course("c1", "Física")]);
        assert_eq!(manager.begin_edit("c1"), FormChange::Opened);
        assert_eq!(manager.editing_id(), Some("c1"));
        assert_eq!(manager.draft().and_then(|d| d.get(DraftField::Name)), Some("Física"));

        // A second edit while the form is open closes it.
        assert_eq!(manager.begin_edit("c1"), FormChange::Closed);
        assert_eq!(manager.editing_id(), None);
    }

    #[test]
    fn test_begin_edit_unknown_row() {
        let mut manager = loaded(vec![]);
        assert_eq!(manager.begin_edit("nope"), FormChange::Missing);
        assert!(!manager.is_form_open());
    }

    #[test]
    fn test_save_targets() {
        let mut manager = loaded(vec![course("c1", "Física")]);

        manager.begin_create();
        manager.set_field(DraftField::Name, "Química".into());
        let mutation = manager.begin_save().unwrap().unwrap();
        assert_eq!(mutation.target, SaveTarget::Create);
        manager.apply_saved(mutation.ticket, Ok(()));

        manager.begin_edit("c1");
        let mutation = manager.begin_save().unwrap().unwrap();
        assert_eq!(mutation.target, SaveTarget::Update("c1".into()));
    }

    #[test]
    fn test_save_while_busy_is_ignored() {
        let mut manager = ResourceManager::<Course>::new();
        manager.begin_create();
        manager.set_field(DraftField::Name, "Física".into());

        assert!(manager.begin_save().unwrap().is_some());
        assert!(manager.is_busy());
        assert!(manager.begin_save().unwrap().is_none());
    }

    #[test]
    fn test_form_is_locked_while_saving() {
        let mut manager = loaded(vec![course("c1", "Física")]);
        manager.begin_create();
        manager.set_field(DraftField::Name, "Química".into());
        let mutation = manager.begin_save().unwrap().unwrap();

        assert_eq!(manager.begin_create(), FormChange::Busy);
        assert_eq!(manager.begin_edit("c1"), FormChange::Busy);
        assert!(!manager.cancel_form());
        assert_eq!(manager.draft().and_then(|d| d.get(DraftField::Name)), Some("Química"));

        manager.apply_saved(mutation.ticket, Ok(()));
        assert!(!manager.is_form_open());
        assert_eq!(manager.begin_create(), FormChange::Opened);
    }

    #[test]
    fn test_failed_save_unlocks_form() {
        let mut manager = ResourceManager::<Course>::new();
        manager.begin_create();
        manager.set_field(DraftField::Name, "Física".into());
        let mutation = manager.begin_save().unwrap().unwrap();
        manager.apply_saved(mutation.ticket, Err(ApiError::ConnectionFailed("timeout".into())));

        assert!(manager.is_form_open());
        assert!(manager.cancel_form());
        assert!(!manager.is_form_open());
    }

    #[test]
    fn test_save_validation_failure_leaves_draft_open() {
        let mut manager = ResourceManager::<Course>::new();
        manager.begin_create();

        let err = manager.begin_save().unwrap_err();
        assert_eq!(err, ValidationError::MissingField(DraftField::Name));
        assert!(manager.is_form_open());
        assert!(!manager.is_busy());
    }

    #[test]
    fn test_successful_save_closes_draft_failed_keeps_it() {
        let mut manager = ResourceManager::<Course>::new();
        manager.begin_create();
        manager.set_field(DraftField::Name, "Física".into());

        let mutation = manager.begin_save().unwrap().unwrap();
        let applied = manager.apply_saved(
            mutation.ticket,
            Err(ApiError::Rejected {
                status: 400,
                message: Some("Nome duplicado".into()),
            }),
        );
        assert!(matches!(applied, MutationApplied::Failed(_)));
        assert!(manager.is_form_open());
        assert!(!manager.is_busy());

        let mutation = manager.begin_save().unwrap().unwrap();
        assert!(matches!(
            manager.apply_saved(mutation.ticket, Ok(())),
            MutationApplied::Succeeded
        ));
        assert!(!manager.is_form_open());
    }

    #[test]
    fn test_declined_removal_sends_nothing() {
        let mut manager = loaded(vec![course("c1", "Física")]);
        assert!(manager.request_removal("c1"));
        assert_eq!(manager.pending_removal(), Some("c1"));

        assert_eq!(manager.confirm_removal(false), None);
        assert_eq!(manager.pending_removal(), None);
        assert_eq!(manager.items().len(), 1);
    }

    #[test]
    fn test_confirmed_removal_leaves_items_until_refetch() {
        let mut manager = loaded(vec![course("c1", "Física")]);
        manager.request_removal("c1");
        let removal = manager.confirm_removal(true).unwrap();
        assert_eq!(removal.id, "c1");
        assert!(manager.is_busy());

        manager.apply_removed(removal.ticket, Ok(()));
        assert_eq!(manager.items().len(), 1);
        assert!(!manager.is_busy());
    }

    #[test]
    fn test_removal_of_unknown_row_is_refused() {
        let mut manager = loaded(vec![]);
        assert!(!manager.request_removal("c9"));
        assert_eq!(manager.confirm_removal(true), None);
    }

    #[test]
    fn test_reset_forgets_everything() {
        let mut manager = loaded(vec![course("c1", "Física")]);
        manager.begin_search("Fís");
        manager.begin_edit("c1");
        manager.reset();

        assert!(manager.items().is_empty());
        assert_eq!(manager.search_term(), "");
        assert!(!manager.is_form_open());
        assert_eq!(manager.status(), ResourceStatus::Idle);
    }

    #[test]
    fn test_remedial_choices_exclude_course_being_edited() {
        let mut manager = loaded(vec![course("c1", "Física"), course("c2", "Física Básica")]);
        manager.begin_edit("c1");

        let choices = manager.remedial_choices();
        assert_eq!(choices, vec![("c2".to_string(), "Física Básica".to_string())]);
    }
}
