//! services/client/src/adapters/memory.rs
//!
//! A process-local implementation of the `DocumentStore` port. Every write is
//! broadcast as a change notice and each live query re-evaluates itself on
//! notices for its collection. Used by the demo binary when no database is
//! configured, and by the tests, which can make it fail on demand.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;
use wellness_core::ports::{
    CollectionPath, Direction, Document, DocumentStore, PortError, PortResult, Query, Snapshot,
    SnapshotStream,
};

const CHANGE_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
enum Change {
    Updated(CollectionPath),
    /// Every open stream ends with an error.
    Severed,
}

#[derive(Default)]
struct Collections {
    docs: HashMap<CollectionPath, BTreeMap<String, Map<String, Value>>>,
}

struct Shared {
    collections: Mutex<Collections>,
    changes: broadcast::Sender<Change>,
    fail_writes: AtomicBool,
    fail_subscriptions: AtomicBool,
    writes: AtomicUsize,
}

impl Shared {
    fn evaluate(&self, query: &Query) -> Snapshot {
        let collections = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        let mut snapshot: Snapshot = collections
            .docs
            .get(&query.path)
            .into_iter()
            .flatten()
            .map(|(id, data)| Document { id: id.clone(), data: Value::Object(data.clone()) })
            .filter(|doc| query.filter.as_ref().map_or(true, |f| f.matches(&doc.data)))
            .collect();

        // Documents come out of the map in id order; the stable sort keeps that
        // order among documents that tie on the ordering field.
        if let Some(order) = &query.order {
            snapshot.sort_by(|a, b| {
                let by_field = compare_values(a.data.get(&order.field), b.data.get(&order.field));
                match order.direction {
                    Direction::Ascending => by_field,
                    Direction::Descending => by_field.reverse(),
                }
            });
        }
        snapshot
    }

    fn notify(&self, path: &CollectionPath) {
        // No receivers just means no live queries.
        let _ = self.changes.send(Change::Updated(path.clone()));
    }

    fn check_writable(&self) -> PortResult<()> {
        if self.fail_writes.load(AtomicOrdering::SeqCst) {
            return Err(PortError::Unavailable("store is rejecting writes".to_string()));
        }
        Ok(())
    }
}

/// Orders two field values: booleans, then numbers, then strings. Missing
/// values and anything else sort after all of them.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            Some(Value::Bool(_)) => 0,
            Some(Value::Number(_)) => 1,
            Some(Value::String(_)) => 2,
            _ => 3,
        }
    }
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(f64::NAN), y.as_f64().unwrap_or(f64::NAN));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn into_object(data: Value) -> PortResult<Map<String, Value>> {
    match data {
        Value::Object(map) => Ok(map),
        other => Err(PortError::InvalidPayload(format!("expected a JSON object, got {}", other))),
    }
}

#[derive(Clone)]
pub struct InMemoryStore {
    shared: Arc<Shared>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                collections: Mutex::new(Collections::default()),
                changes,
                fail_writes: AtomicBool::new(false),
                fail_subscriptions: AtomicBool::new(false),
                writes: AtomicUsize::new(0),
            }),
        }
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every create, update and delete fails with `Unavailable`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.shared.fail_writes.store(fail, AtomicOrdering::SeqCst);
    }

    /// While set, opening a live query fails with `Unavailable`.
    pub fn set_fail_subscriptions(&self, fail: bool) {
        self.shared.fail_subscriptions.store(fail, AtomicOrdering::SeqCst);
    }

    /// Ends every open snapshot stream with an error.
    pub fn sever_subscriptions(&self) {
        let _ = self.shared.changes.send(Change::Severed);
    }

    /// Number of accepted creates, updates and deletes.
    pub fn write_count(&self) -> usize {
        self.shared.writes.load(AtomicOrdering::SeqCst)
    }

    pub fn document_count(&self, path: &CollectionPath) -> usize {
        let collections = self.shared.collections.lock().unwrap_or_else(|e| e.into_inner());
        collections.docs.get(path).map_or(0, |c| c.len())
    }

    /// Number of live queries currently listening for changes.
    pub fn listener_count(&self) -> usize {
        self.shared.changes.receiver_count()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn subscribe(&self, query: Query) -> PortResult<SnapshotStream> {
        if self.shared.fail_subscriptions.load(AtomicOrdering::SeqCst) {
            return Err(PortError::Unavailable(format!("cannot listen to {}", query.path)));
        }
        // Listen before the first evaluation so no change slips between the two.
        let mut changes = self.shared.changes.subscribe();
        let shared = self.shared.clone();

        let stream = async_stream::stream! {
            let mut last = shared.evaluate(&query);
            yield Ok(last.clone());
            loop {
                match changes.recv().await {
                    Ok(Change::Updated(path)) if path != query.path => continue,
                    Ok(Change::Updated(_)) => {}
                    Ok(Change::Severed) => {
                        yield Err(PortError::Unavailable(format!("listener on {} severed", query.path)));
                        break;
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!("Listener on {} skipped {} change notices.", query.path, skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
                let snapshot = shared.evaluate(&query);
                if snapshot != last {
                    last = snapshot.clone();
                    yield Ok(snapshot);
                }
            }
        };
        Ok(Box::pin(stream))
    }

    async fn read(&self, query: &Query) -> PortResult<Snapshot> {
        Ok(self.shared.evaluate(query))
    }

    async fn create(&self, path: &CollectionPath, data: Value) -> PortResult<String> {
        self.shared.check_writable()?;
        let data = into_object(data)?;
        let id = Uuid::now_v7().to_string();
        {
            let mut collections = self.shared.collections.lock().unwrap_or_else(|e| e.into_inner());
            collections.docs.entry(path.clone()).or_default().insert(id.clone(), data);
        }
        self.shared.writes.fetch_add(1, AtomicOrdering::SeqCst);
        self.shared.notify(path);
        Ok(id)
    }

    async fn update(&self, path: &CollectionPath, id: &str, patch: Value) -> PortResult<()> {
        self.shared.check_writable()?;
        let patch = into_object(patch)?;
        {
            let mut collections = self.shared.collections.lock().unwrap_or_else(|e| e.into_inner());
            let doc = collections
                .docs
                .get_mut(path)
                .and_then(|c| c.get_mut(id))
                .ok_or_else(|| PortError::NotFound(path.document(id)))?;
            doc.extend(patch);
        }
        self.shared.writes.fetch_add(1, AtomicOrdering::SeqCst);
        self.shared.notify(path);
        Ok(())
    }

    async fn delete(&self, path: &CollectionPath, id: &str) -> PortResult<()> {
        self.shared.check_writable()?;
        let removed = {
            let mut collections = self.shared.collections.lock().unwrap_or_else(|e| e.into_inner());
            collections.docs.get_mut(path).and_then(|c| c.remove(id)).is_some()
        };
        // Deleting a missing document succeeds without a change notice.
        if removed {
            self.shared.writes.fetch_add(1, AtomicOrdering::SeqCst);
            self.shared.notify(path);
        }
        Ok(())
    }
}
