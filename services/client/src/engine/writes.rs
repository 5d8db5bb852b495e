//! services/client/src/engine/writes.rs
//!
//! Issues creates, updates and deletes against the store.
//!
//! Nothing is rendered ahead of the store: no placeholder entry is inserted and
//! no existing entry is pre-mutated. The view changes only when the next
//! snapshot arrives, so there is never anything to roll back. A failed write is
//! logged and reported to the caller, and simply never shows up in a snapshot.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};
use wellness_core::ports::{CollectionPath, DocumentStore};

use crate::error::SyncError;
use crate::records::Payload;

#[derive(Clone)]
pub struct WriteQueue {
    store: Arc<dyn DocumentStore>,
}

impl WriteQueue {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Writes a new document. Returns its id, or `None` if the write failed.
    pub async fn create<P: Payload + Sync>(&self, path: &CollectionPath, record: &P) -> Option<String> {
        let payload = match record.to_payload() {
            Ok(payload) => payload,
            Err(e) => {
                error!("{}", SyncError::WriteFailure(format!("{} ({})", e, path)));
                return None;
            }
        };
        match self.store.create(path, payload).await {
            Ok(id) => {
                debug!("Created {}.", path.document(&id));
                Some(id)
            }
            Err(e) => {
                error!("{}", SyncError::WriteFailure(format!("create in {}: {}", path, e)));
                None
            }
        }
    }

    /// Merges `patch` into the document `id`. Returns whether the store accepted it.
    pub async fn update(&self, path: &CollectionPath, id: &str, patch: Value) -> bool {
        match self.store.update(path, id, patch).await {
            Ok(()) => {
                debug!("Updated {}.", path.document(id));
                true
            }
            Err(e) => {
                error!("{}", SyncError::WriteFailure(format!("update of {}: {}", path.document(id), e)));
                false
            }
        }
    }

    pub async fn delete(&self, path: &CollectionPath, id: &str) -> bool {
        match self.store.delete(path, id).await {
            Ok(()) => {
                debug!("Deleted {}.", path.document(id));
                true
            }
            Err(e) => {
                error!("{}", SyncError::WriteFailure(format!("delete of {}: {}", path.document(id), e)));
                false
            }
        }
    }
}
