//! services/client/src/views/mood.rs
//!
//! Mood logging and journaling.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use wellness_core::domain::{JournalEntry, Mood, MoodEntry, Session};
use wellness_core::ports::Collection;

use crate::engine::{LiveView, SubscriptionManager};
use crate::records::{DatedTextRecord, MoodRecord};
use crate::state::AppState;

/// Length of the recent-moods and recent-entries lists.
pub const RECENT_LIST_LIMIT: usize = 5;
/// How many moods the trend chart plots.
pub const MOOD_TREND_LIMIT: usize = 14;

pub struct MoodTrackerView {
    app: Arc<AppState>,
    session: Session,
    moods: LiveView<MoodEntry>,
    journal: LiveView<JournalEntry>,
    subscriptions: SubscriptionManager,
}

impl MoodTrackerView {
    pub async fn open(app: Arc<AppState>, session: Session, scope: CancellationToken) -> Self {
        let mut subscriptions =
            SubscriptionManager::new(app.store.clone(), app.config.app_id.clone(), scope);
        let moods = LiveView::new();
        let journal = LiveView::new();
        subscriptions.subscribe(&session, None, moods.clone(), None).await;
        subscriptions.subscribe(&session, None, journal.clone(), None).await;
        Self { app, session, moods, journal, subscriptions }
    }

    /// Logs `mood` for today. The entry appears with the next snapshot.
    pub async fn log_mood(&self, mood: Mood) -> Option<String> {
        let path = self.app.path(&self.session, Collection::Moods);
        let record = MoodRecord::new(mood, self.app.clock.now());
        let id = self.app.writes().create(&path, &record).await;
        if id.is_some() {
            info!("Logged mood '{}'.", mood.as_str());
        }
        id
    }

    /// Saves a journal entry for today. Blank text is ignored.
    pub async fn save_journal(&self, content: &str) -> Option<String> {
        let content = content.trim();
        if content.is_empty() {
            return None;
        }
        let path = self.app.path(&self.session, Collection::JournalEntries);
        let record = DatedTextRecord::new(content, self.app.clock.now());
        self.app.writes().create(&path, &record).await
    }

    pub fn journal_prompt(&self) -> &'static str {
        self.app.responder.journal_prompt()
    }

    pub fn moods(&self) -> &LiveView<MoodEntry> {
        &self.moods
    }

    pub fn journal(&self) -> &LiveView<JournalEntry> {
        &self.journal
    }

    pub async fn recent_moods(&self) -> Vec<MoodEntry> {
        self.moods.read(|v| v.window(RECENT_LIST_LIMIT).to_vec()).await
    }

    pub async fn recent_journal(&self) -> Vec<JournalEntry> {
        self.journal.read(|v| v.window(RECENT_LIST_LIMIT).to_vec()).await
    }

    /// The last fourteen moods, oldest first.
    pub async fn mood_trend(&self) -> Vec<MoodEntry> {
        self.moods.read(|v| v.chart_window(MOOD_TREND_LIMIT)).await
    }

    pub async fn close(mut self) {
        self.subscriptions.shutdown().await;
    }
}
