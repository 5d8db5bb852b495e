//! services/client/src/engine/seed.rs
//!
//! The once-only "populate defaults if the collection is empty" initializer.
//!
//! Emptiness is judged from whatever snapshot the caller observed, and several
//! snapshots can look empty before the first seed write echoes back. The latch
//! is therefore claimed synchronously, before any write is issued, so only the
//! first empty observation per collection path ever writes.

use std::collections::HashSet;
use std::sync::Mutex;
use tracing::{debug, info, warn};
use wellness_core::ports::{CollectionPath, Document};

use crate::engine::writes::WriteQueue;
use crate::records::Payload;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// This observation won the latch. `written` counts accepted writes.
    Seeded { written: usize },
    /// The observed snapshot already had documents.
    NotEmpty,
    /// Another observation already seeded (or is seeding) this collection.
    AlreadyClaimed,
}

/// Proof that the caller holds the seed latch for one collection path.
#[derive(Debug)]
pub struct SeedClaim {
    path: CollectionPath,
}

impl SeedClaim {
    pub fn path(&self) -> &CollectionPath {
        &self.path
    }

    /// Writes every default once. A failed write is logged and not retried;
    /// the latch stays claimed.
    pub async fn write_all<P: Payload + Sync>(self, writes: &WriteQueue, defaults: &[P]) -> SeedOutcome {
        info!("Seeding {} with {} default documents.", self.path, defaults.len());
        let mut written = 0;
        for payload in defaults {
            if writes.create(&self.path, payload).await.is_some() {
                written += 1;
            }
        }
        if written < defaults.len() {
            warn!("Seeded {} of {} defaults into {}.", written, defaults.len(), self.path);
        }
        SeedOutcome::Seeded { written }
    }
}

/// Latch keyed by collection path. Private paths embed the session id, so the
/// key is effectively `(session, collection)`.
#[derive(Debug, Default)]
pub struct SeedGuard {
    claimed: Mutex<HashSet<CollectionPath>>,
}

impl SeedGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// The synchronous check-and-set. Succeeds only for an empty observation
    /// that reaches the latch first.
    pub fn claim(&self, path: &CollectionPath, observed: &[Document]) -> Result<SeedClaim, SeedOutcome> {
        if !observed.is_empty() {
            return Err(SeedOutcome::NotEmpty);
        }
        let mut claimed = self.claimed.lock().unwrap_or_else(|e| e.into_inner());
        if !claimed.insert(path.clone()) {
            debug!("Seed latch for {} already claimed.", path);
            return Err(SeedOutcome::AlreadyClaimed);
        }
        Ok(SeedClaim { path: path.clone() })
    }

    pub fn is_claimed(&self, path: &CollectionPath) -> bool {
        self.claimed.lock().unwrap_or_else(|e| e.into_inner()).contains(path)
    }

    pub async fn seed_if_empty<P: Payload + Sync>(
        &self,
        writes: &WriteQueue,
        path: &CollectionPath,
        observed: &[Document],
        defaults: &[P],
    ) -> SeedOutcome {
        match self.claim(path, observed) {
            Ok(claim) => claim.write_all(writes, defaults).await,
            Err(outcome) => outcome,
        }
    }
}
