//! services/client/src/engine/subscriptions.rs
//!
//! Owns the lifecycle of live queries: one spawned task per subscription, each
//! bound to a `CancellationToken`, feeding snapshots into a `LiveView`.
//!
//! # Lifecycle
//!
//! ```text
//! Unsubscribed --subscribe()--> Subscribing --first snapshot--> Active
//!      ^                             |                            |
//!      +------ unsubscribe() / filter change / failure / drop ----+
//! ```

use futures::StreamExt;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::{sync::watch, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use wellness_core::domain::Session;
use wellness_core::ports::{Collection, CollectionPath, Document, DocumentStore, FieldFilter, Query};

use crate::engine::view::LiveView;
use crate::error::SyncError;
use crate::records::Record;

/// Runs after each snapshot has been applied to the view.
pub type SnapshotHook = Arc<dyn Fn(&[Document]) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    Unsubscribed,
    Subscribing,
    Active,
}

/// The logical key a manager allows at most one live subscription for.
/// A filter change replaces the subscription held under the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionKey {
    pub session_id: String,
    pub collection: Collection,
}

impl fmt::Display for SubscriptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.session_id, self.collection.name())
    }
}

struct LiveSubscription {
    filter: Option<FieldFilter>,
    token: CancellationToken,
    state: watch::Receiver<SubscriptionState>,
    task: JoinHandle<()>,
}

impl LiveSubscription {
    fn is_live(&self) -> bool {
        *self.state.borrow() != SubscriptionState::Unsubscribed
    }
}

/// Tracks the live queries owned by a single view.
///
/// The manager's scope is a child of the token it is created with, and every
/// subscription token is a child of that scope. Dropping the manager tears down
/// its own subscriptions only; cancelling the parent token tears down all of them.
pub struct SubscriptionManager {
    store: Arc<dyn DocumentStore>,
    app_id: String,
    scope: CancellationToken,
    live: HashMap<SubscriptionKey, LiveSubscription>,
}

impl SubscriptionManager {
    pub fn new(store: Arc<dyn DocumentStore>, app_id: impl Into<String>, scope: CancellationToken) -> Self {
        Self { store, app_id: app_id.into(), scope: scope.child_token(), live: HashMap::new() }
    }

    /// Opens a live query for `T`'s collection and feeds it into `view`.
    ///
    /// Subscribing again with the same filter while the previous subscription is
    /// still live is a no-op. With a different filter, the previous subscription
    /// is closed and its task joined before the new query is opened.
    pub async fn subscribe<T: Record>(
        &mut self,
        session: &Session,
        filter: Option<FieldFilter>,
        view: LiveView<T>,
        hook: Option<SnapshotHook>,
    ) -> SubscriptionKey {
        let key = SubscriptionKey { session_id: session.id.clone(), collection: T::COLLECTION };

        if let Some(existing) = self.live.get(&key) {
            if existing.filter == filter && existing.is_live() {
                debug!("Subscription {} already live, reusing it.", key);
                return key;
            }
            self.unsubscribe(&key).await;
        }

        let path = CollectionPath::resolve(&self.app_id, session, T::COLLECTION);
        let mut query = Query::new(path).ordered_by(T::COLLECTION.ordering());
        if let Some(f) = &filter {
            query = query.filtered(f.clone());
        }

        let token = self.scope.child_token();
        let (state_tx, state_rx) = watch::channel(SubscriptionState::Subscribing);
        let task = {
            let store = self.store.clone();
            let key = key.clone();
            let token = token.clone();
            tokio::spawn(async move {
                run_subscription(store, query, key, view, hook, token, state_tx).await;
            })
        };

        info!("Subscribing to {}.", key);
        self.live.insert(key.clone(), LiveSubscription { filter, token, state: state_rx, task });
        key
    }

    /// Closes the subscription under `key` and waits for its task to finish.
    /// Returns `false` when nothing was subscribed.
    pub async fn unsubscribe(&mut self, key: &SubscriptionKey) -> bool {
        let Some(sub) = self.live.remove(key) else {
            return false;
        };
        sub.token.cancel();
        if let Err(e) = sub.task.await {
            error!("Subscription task for {} ended abnormally: {:?}", key, e);
        }
        info!("Unsubscribed from {}.", key);
        true
    }

    /// Closes every subscription this manager owns.
    pub async fn shutdown(&mut self) {
        let keys: Vec<_> = self.live.keys().cloned().collect();
        for key in keys {
            self.unsubscribe(&key).await;
        }
    }

    /// The token every subscription of this manager descends from.
    pub fn scope(&self) -> &CancellationToken {
        &self.scope
    }

    pub fn state(&self, key: &SubscriptionKey) -> SubscriptionState {
        self.live
            .get(key)
            .map(|s| *s.state.borrow())
            .unwrap_or(SubscriptionState::Unsubscribed)
    }

    /// Observes the state transitions of the subscription under `key`.
    pub fn state_changes(&self, key: &SubscriptionKey) -> Option<watch::Receiver<SubscriptionState>> {
        self.live.get(key).map(|s| s.state.clone())
    }

    pub fn filter(&self, key: &SubscriptionKey) -> Option<&FieldFilter> {
        self.live.get(key).and_then(|s| s.filter.as_ref())
    }

    /// Number of subscriptions that are subscribing or active.
    pub fn live_count(&self) -> usize {
        self.live.values().filter(|s| s.is_live()).count()
    }
}

impl Drop for SubscriptionManager {
    fn drop(&mut self) {
        self.scope.cancel();
    }
}

/// The worker behind one subscription. Store errors end the subscription and
/// mark the view failed; nothing is retried.
async fn run_subscription<T: Record>(
    store: Arc<dyn DocumentStore>,
    query: Query,
    key: SubscriptionKey,
    view: LiveView<T>,
    hook: Option<SnapshotHook>,
    token: CancellationToken,
    state: watch::Sender<SubscriptionState>,
) {
    let opened = tokio::select! {
        _ = token.cancelled() => None,
        result = store.subscribe(query) => Some(result),
    };
    let mut stream = match opened {
        None => {
            state.send_replace(SubscriptionState::Unsubscribed);
            return;
        }
        Some(Ok(stream)) => stream,
        Some(Err(e)) => {
            error!("{}", SyncError::SubscriptionFailure { key: key.to_string(), reason: e.to_string() });
            view.mark_failed(e.to_string()).await;
            state.send_replace(SubscriptionState::Unsubscribed);
            return;
        }
    };

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            next = stream.next() => match next {
                Some(Ok(snapshot)) => {
                    view.apply_snapshot(&snapshot).await;
                    state.send_if_modified(|s| {
                        let first = *s != SubscriptionState::Active;
                        *s = SubscriptionState::Active;
                        first
                    });
                    debug!("Applied snapshot of {} documents to {}.", snapshot.len(), key);
                    if let Some(hook) = &hook {
                        hook(&snapshot);
                    }
                }
                Some(Err(e)) => {
                    error!("{}", SyncError::SubscriptionFailure { key: key.to_string(), reason: e.to_string() });
                    view.mark_failed(e.to_string()).await;
                    break;
                }
                None => {
                    warn!("Store closed the snapshot stream for {}.", key);
                    break;
                }
            }
        }
    }

    drop(stream);
    state.send_replace(SubscriptionState::Unsubscribed);
}
