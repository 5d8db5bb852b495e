//! services/client/src/engine/view.rs
//!
//! The ordered, per-collection local cache that each live query feeds.
//!
//! A view is never patched incrementally: every snapshot rebuilds it wholesale,
//! which makes any intermediate staleness self-correcting.

use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::warn;
use wellness_core::ports::{Direction, Document};

use crate::records::Record;

/// Whether a view reflects a real snapshot yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewStatus {
    /// No snapshot has arrived yet.
    Loading,
    /// Entries reflect the latest snapshot.
    Ready,
    /// The live query failed. Entries hold whatever the last snapshot delivered.
    Failed(String),
}

/// Decodes and orders one snapshot. Undecodable documents are skipped.
///
/// The sort is stable, so entries sharing a key keep the store's relative order
/// (stores break ordering ties by document id).
pub fn rebuild<T: Record>(snapshot: &[Document]) -> Vec<T> {
    let mut entries: Vec<T> = snapshot
        .iter()
        .filter_map(|doc| match T::from_document(doc) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping document in {}: {}", T::COLLECTION.name(), e);
                None
            }
        })
        .collect();
    match T::direction() {
        Direction::Ascending => entries.sort_by(|a, b| a.sort_key().cmp(&b.sort_key())),
        Direction::Descending => entries.sort_by(|a, b| b.sort_key().cmp(&a.sort_key())),
    }
    entries
}

#[derive(Debug, Clone)]
pub struct OrderedView<T> {
    entries: Vec<T>,
    status: ViewStatus,
    revision: u64,
}

impl<T: Record> Default for OrderedView<T> {
    fn default() -> Self {
        Self { entries: Vec::new(), status: ViewStatus::Loading, revision: 0 }
    }
}

impl<T: Record> OrderedView<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every entry with the decoded, ordered contents of `snapshot`.
    pub fn apply_snapshot(&mut self, snapshot: &[Document]) {
        self.entries = rebuild(snapshot);
        self.status = ViewStatus::Ready;
        self.revision += 1;
    }

    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        self.status = ViewStatus::Failed(reason.into());
        self.revision += 1;
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn status(&self) -> &ViewStatus {
        &self.status
    }

    /// Bumped on every snapshot or failure.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn first(&self) -> Option<&T> {
        self.entries.first()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries.iter().find(|e| e.id() == id)
    }

    /// The first `limit` entries in view order. A display cap, not a storage limit.
    pub fn window(&self, limit: usize) -> &[T] {
        &self.entries[..self.entries.len().min(limit)]
    }

    /// The first `limit` entries, reversed. For a descending view this yields the
    /// most recent entries in chronological order, as a chart plots them.
    pub fn chart_window(&self, limit: usize) -> Vec<T> {
        self.window(limit).iter().rev().cloned().collect()
    }
}

/// A view shared between the subscription task that feeds it and its consumer.
pub struct LiveView<T> {
    state: Arc<Mutex<OrderedView<T>>>,
    changes: Arc<watch::Sender<u64>>,
}

impl<T> Clone for LiveView<T> {
    fn clone(&self) -> Self {
        Self { state: self.state.clone(), changes: self.changes.clone() }
    }
}

impl<T: Record> Default for LiveView<T> {
    fn default() -> Self {
        let (changes, _) = watch::channel(0);
        Self { state: Arc::new(Mutex::new(OrderedView::new())), changes: Arc::new(changes) }
    }
}

impl<T: Record> LiveView<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn apply_snapshot(&self, snapshot: &[Document]) {
        let revision = {
            let mut view = self.state.lock().await;
            view.apply_snapshot(snapshot);
            view.revision()
        };
        self.changes.send_replace(revision);
    }

    pub async fn mark_failed(&self, reason: impl Into<String>) {
        let revision = {
            let mut view = self.state.lock().await;
            view.mark_failed(reason);
            view.revision()
        };
        self.changes.send_replace(revision);
    }

    /// Runs `f` against the current state of the view.
    pub async fn read<R>(&self, f: impl FnOnce(&OrderedView<T>) -> R) -> R {
        let view = self.state.lock().await;
        f(&view)
    }

    pub async fn entries(&self) -> Vec<T> {
        self.read(|v| v.entries().to_vec()).await
    }

    pub async fn status(&self) -> ViewStatus {
        self.read(|v| v.status().clone()).await
    }

    /// A receiver that observes every revision bump.
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    /// Resolves once `predicate` holds for the view.
    pub async fn wait_until<F>(&self, mut predicate: F)
    where
        F: FnMut(&OrderedView<T>) -> bool,
    {
        let mut rx = self.changes.subscribe();
        loop {
            if predicate(&*self.state.lock().await) {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use serde_json::json;
    use wellness_core::domain::{ChatMessage, MoodEntry};

    fn mood_doc(id: &str, day: u32, mood: &str) -> Document {
        let date = NaiveDate::from_ymd_opt(2026, 1, day).unwrap();
        let created = Utc.with_ymd_and_hms(2026, 1, day, 9, 0, 0).unwrap();
        Document {
            id: id.to_string(),
            data: json!({ "mood": mood, "moodScore": 3, "date": date.to_string(),
                          "createdAt": created.to_rfc3339() }),
        }
    }

    #[test]
    fn descending_view_puts_latest_day_first() {
        let snapshot = vec![mood_doc("a", 3, "sad"), mood_doc("b", 9, "happy"), mood_doc("c", 5, "calm")];
        let view: Vec<MoodEntry> = rebuild(&snapshot);
        let ids: Vec<_> = view.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["b", "c", "a"]);
    }

    #[test]
    fn ties_keep_snapshot_order() {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let msg = |id: &str| Document {
            id: id.to_string(),
            data: json!({ "content": id, "sender": "user", "timestamp": at.to_rfc3339() }),
        };
        let later = Document {
            id: "z".to_string(),
            data: json!({ "content": "z", "sender": "assistant",
                          "timestamp": (at + Duration::seconds(1)).to_rfc3339() }),
        };
        let view: Vec<ChatMessage> = rebuild(&[later, msg("q"), msg("b")]);
        let ids: Vec<_> = view.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["q", "b", "z"]);
    }

    #[test]
    fn malformed_documents_are_skipped() {
        let snapshot = vec![
            mood_doc("ok", 2, "calm"),
            Document { id: "bad".to_string(), data: json!({ "mood": 7 }) },
        ];
        let mut view = OrderedView::<MoodEntry>::new();
        view.apply_snapshot(&snapshot);
        assert_eq!(view.len(), 1);
        assert_eq!(view.status(), &ViewStatus::Ready);
    }

    #[test]
    fn chart_window_is_most_recent_in_ascending_order() {
        let snapshot: Vec<_> = (1..=20).map(|d| mood_doc(&format!("m{}", d), d, "calm")).collect();
        let mut view = OrderedView::<MoodEntry>::new();
        view.apply_snapshot(&snapshot);

        let chart = view.chart_window(7);
        let days: Vec<u32> = chart.iter().map(|m| chrono::Datelike::day(&m.date)).collect();
        assert_eq!(days, [14, 15, 16, 17, 18, 19, 20]);
        assert_eq!(view.window(5).len(), 5);
        assert_eq!(view.window(50).len(), 20);
    }

    #[test]
    fn every_snapshot_replaces_the_view() {
        let mut view = OrderedView::<MoodEntry>::new();
        assert_eq!(view.status(), &ViewStatus::Loading);
        view.apply_snapshot(&[mood_doc("a", 1, "sad"), mood_doc("b", 2, "sad")]);
        view.apply_snapshot(&[mood_doc("c", 3, "happy")]);
        assert_eq!(view.len(), 1);
        assert_eq!(view.first().map(|m| m.id.as_str()), Some("c"));
        assert_eq!(view.revision(), 2);
    }
}
