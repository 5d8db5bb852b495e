//! crates/wellness_core/src/ports.rs
//!
//! Defines the service contracts (traits) the sync core depends on.
//! These traits form the boundary of the hexagonal architecture, keeping the core
//! independent of the hosted document store and the identity provider behind it.

use async_trait::async_trait;
use futures::Stream;
use serde_json::Value;
use std::fmt;
use std::pin::Pin;

use crate::domain::Session;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Malformed payload: {0}")]
    InvalidPayload(String),
    #[error("Service unavailable: {0}")]
    Unavailable(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Collection Addressing
//=========================================================================================

/// The per-user and shared collections the application reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Moods,
    JournalEntries,
    Goals,
    ChatMessages,
    Consultations,
    ConsultationMessages,
    GratitudeEntries,
    Articles,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Moods => "moods",
            Collection::JournalEntries => "journal_entries",
            Collection::Goals => "goals",
            Collection::ChatMessages => "chat_messages",
            Collection::Consultations => "consultations",
            Collection::ConsultationMessages => "consultation_messages",
            Collection::GratitudeEntries => "gratitude_entries",
            Collection::Articles => "articles",
        }
    }

    /// Shared collections live outside any session's namespace.
    pub fn is_public(self) -> bool {
        matches!(self, Collection::Articles)
    }

    /// The server-side ordering a live query on this collection asks for.
    pub fn ordering(self) -> OrderBy {
        match self {
            Collection::Moods | Collection::JournalEntries | Collection::GratitudeEntries => {
                OrderBy::new("date", Direction::Descending)
            }
            Collection::ChatMessages | Collection::ConsultationMessages => {
                OrderBy::new("timestamp", Direction::Ascending)
            }
            Collection::Goals => OrderBy::new("createdAt", Direction::Ascending),
            Collection::Consultations | Collection::Articles => {
                OrderBy::new("date", Direction::Descending)
            }
        }
    }
}

/// A hierarchical collection path.
///
/// Private collections live at `artifacts/<appId>/users/<sessionId>/<collection>`,
/// shared ones at `artifacts/<appId>/public/data/<collection>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(String);

impl CollectionPath {
    pub fn private(app_id: &str, session: &Session, collection: Collection) -> Self {
        Self(format!("artifacts/{}/users/{}/{}", app_id, session.id, collection.name()))
    }

    pub fn public(app_id: &str, collection: Collection) -> Self {
        Self(format!("artifacts/{}/public/data/{}", app_id, collection.name()))
    }

    /// Picks the public or private form depending on the collection.
    pub fn resolve(app_id: &str, session: &Session, collection: Collection) -> Self {
        if collection.is_public() {
            Self::public(app_id, collection)
        } else {
            Self::private(app_id, session, collection)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The full path of a single document in this collection.
    pub fn document(&self, id: &str) -> String {
        format!("{}/{}", self.0, id)
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//=========================================================================================
// Queries & Snapshots
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

impl OrderBy {
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self { field: field.into(), direction }
    }
}

/// Server-side equality filter on a single top-level field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub value: Value,
}

impl FieldFilter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { field: field.into(), value: value.into() }
    }

    pub fn matches(&self, data: &Value) -> bool {
        data.get(&self.field) == Some(&self.value)
    }
}

/// A live or one-shot query over one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub path: CollectionPath,
    pub filter: Option<FieldFilter>,
    pub order: Option<OrderBy>,
}

impl Query {
    pub fn new(path: CollectionPath) -> Self {
        Self { path, filter: None, order: None }
    }

    pub fn filtered(mut self, filter: FieldFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn ordered_by(mut self, order: OrderBy) -> Self {
        self.order = Some(order);
        self
    }
}

/// A stored document: the server-assigned id plus its JSON payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

/// A complete, ordered result set for a query.
pub type Snapshot = Vec<Document>;

/// Every item supersedes the previous one. Dropping the stream unsubscribes.
pub type SnapshotStream = Pin<Box<dyn Stream<Item = PortResult<Snapshot>> + Send>>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Opens a live query. The first snapshot is delivered once the query is
    /// established, then one more every time the result set changes.
    async fn subscribe(&self, query: Query) -> PortResult<SnapshotStream>;

    /// Fetches the current result set once.
    async fn read(&self, query: &Query) -> PortResult<Snapshot>;

    /// Stores a new document and returns its server-assigned id.
    async fn create(&self, path: &CollectionPath, data: Value) -> PortResult<String>;

    /// Merges the top-level fields of `patch` into an existing document.
    async fn update(&self, path: &CollectionPath, id: &str, patch: Value) -> PortResult<()>;

    async fn delete(&self, path: &CollectionPath, id: &str) -> PortResult<()>;
}

#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Establishes a session from a custom token handed to the application.
    async fn sign_in_with_token(&self, token: &str) -> PortResult<Session>;

    async fn sign_in_anonymously(&self) -> PortResult<Session>;

    async fn sign_out(&self) -> PortResult<()>;

    /// The session currently established, if any.
    fn current(&self) -> Option<Session>;
}
