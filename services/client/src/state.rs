//! services/client/src/state.rs
//!
//! Defines the state shared by every view of the client.

use crate::config::Config;
use crate::engine::{Clock, Responder, SeedGuard, WriteQueue};
use std::sync::Arc;
use wellness_core::domain::Session;
use wellness_core::ports::{Collection, CollectionPath, DocumentStore, SessionProvider};

/// The shared client state, created once at startup and handed to every view.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub sessions: Arc<dyn SessionProvider>,
    pub config: Arc<Config>,
    /// The one deliberately shared mutable resource across views.
    pub seed_guard: Arc<SeedGuard>,
    pub responder: Arc<Responder>,
    pub clock: Arc<Clock>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        sessions: Arc<dyn SessionProvider>,
        config: Arc<Config>,
    ) -> Self {
        let responder = Responder::new(config.responder_seed, config.consultation_reply_delay);
        Self {
            store,
            sessions,
            config,
            seed_guard: Arc::new(SeedGuard::new()),
            responder: Arc::new(responder),
            clock: Arc::new(Clock::new()),
        }
    }

    pub fn writes(&self) -> WriteQueue {
        WriteQueue::new(self.store.clone())
    }

    /// Where `collection` lives for `session`.
    pub fn path(&self, session: &Session, collection: Collection) -> CollectionPath {
        CollectionPath::resolve(&self.config.app_id, session, collection)
    }
}
