//! Background tasks for network calls and timers.
//!
//! The controller never awaits inline. Each operation is spawned as a tokio
//! task that reports back through an unbounded channel as an [`ApiMessage`];
//! the event loop receives messages and feeds them to the controller, which
//! checks the ticket or epoch the task captured before applying anything.
//!
//! # Adding New Task Types
//!
//! 1. Add a variant to `ApiMessage` for the result
//! 2. Add a spawn method to `TaskSpawner`
//! 3. Handle the message in `App::handle_message`

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use crate::api::types::{Credentials, HistoryEntry, LoginResponse, RemedialEvaluation, Role};
use crate::api::{ApiClient, ApiError, BearerToken};
use crate::resource::{Entity, Mutation, Outcome, Removal, ResourceEvent, SaveTarget, Ticket};

/// Messages sent from background tasks to the event loop.
#[derive(Debug)]
pub enum ApiMessage {
    LoggedIn {
        epoch: u64,
        result: Result<LoginResponse, ApiError>,
    },

    Registered {
        epoch: u64,
        result: Result<(), ApiError>,
    },

    /// Time to leave the registration page for the login page.
    RegisterRedirectDue { epoch: u64 },

    /// Any resource manager outcome, including reconciliation timers.
    Resource(ResourceEvent),

    RemedialLoaded {
        epoch: u64,
        result: Result<Vec<RemedialEvaluation>, ApiError>,
    },

    HistoryLoaded {
        epoch: u64,
        result: Result<Vec<HistoryEntry>, ApiError>,
    },
}

/// Spawns background tasks that report through the message channel.
#[derive(Debug, Clone)]
pub struct TaskSpawner {
    tx: mpsc::UnboundedSender<ApiMessage>,
}

impl TaskSpawner {
    pub fn new(tx: mpsc::UnboundedSender<ApiMessage>) -> Self {
        Self { tx }
    }

    fn send(tx: &mpsc::UnboundedSender<ApiMessage>, message: ApiMessage) {
        // The receiver only goes away on shutdown.
        if tx.send(message).is_err() {
            debug!("Task finished after the event loop stopped");
        }
    }

    pub fn spawn_login(&self, client: &ApiClient, epoch: u64, role: Role, credentials: Credentials) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let result = client.login(role, &credentials).await;
            Self::send(&tx, ApiMessage::LoggedIn { epoch, result });
        });
    }

    pub fn spawn_register(&self, client: &ApiClient, epoch: u64, role: Role, credentials: Credentials) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let result = client.register(role, &credentials).await;
            Self::send(&tx, ApiMessage::Registered { epoch, result });
        });
    }

    pub fn spawn_register_redirect(&self, epoch: u64, delay: Duration) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            Self::send(&tx, ApiMessage::RegisterRedirectDue { epoch });
        });
    }

    /// List `E`, or search it by name when `term` is non-empty.
    pub fn spawn_fetch<E: Entity>(
        &self,
        client: &ApiClient,
        token: BearerToken,
        ticket: Ticket,
        term: String,
    ) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let collection = E::KIND.collection();
            let result = client.search::<E>(&token, collection, &term).await;
            let outcome = Outcome::<E>::Listed { ticket, result };
            Self::send(&tx, ApiMessage::Resource(E::event(outcome)));
        });
    }

    pub fn spawn_save<E: Entity>(
        &self,
        client: &ApiClient,
        token: BearerToken,
        mutation: Mutation<E::Payload>,
    ) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let Mutation {
                ticket,
                target,
                payload,
            } = mutation;
            let collection = E::KIND.collection();
            let result = match &target {
                SaveTarget::Create => client.create(&token, collection, &payload).await,
                SaveTarget::Update(id) => client.update(&token, collection, id, &payload).await,
            };
            let outcome = Outcome::<E>::Saved {
                ticket,
                target,
                result,
            };
            Self::send(&tx, ApiMessage::Resource(E::event(outcome)));
        });
    }

    pub fn spawn_remove<E: Entity>(&self, client: &ApiClient, token: BearerToken, removal: Removal) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let Removal { ticket, id } = removal;
            let result = client.delete(&token, E::KIND.collection(), &id).await;
            let outcome = Outcome::<E>::Removed { ticket, id, result };
            Self::send(&tx, ApiMessage::Resource(E::event(outcome)));
        });
    }

    /// Wake the controller after `delay` so it re-fetches `E`.
    ///
    /// Every mutation gets its own timer.
    pub fn spawn_reconcile<E: Entity>(&self, ticket: Ticket, delay: Duration) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let outcome = Outcome::<E>::ReconcileDue { ticket };
            Self::send(&tx, ApiMessage::Resource(E::event(outcome)));
        });
    }

    pub fn spawn_remedial(&self, client: &ApiClient, token: BearerToken, epoch: u64, student_id: String) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let result = client.remedial_summary(&token, &student_id).await;
            Self::send(&tx, ApiMessage::RemedialLoaded { epoch, result });
        });
    }

    pub fn spawn_history(&self, client: &ApiClient, token: BearerToken, epoch: u64, student_id: String) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let result = client.student_history(&token, &student_id).await;
            Self::send(&tx, ApiMessage::HistoryLoaded { epoch, result });
        });
    }
}
