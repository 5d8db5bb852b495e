//! services/client/src/views/dashboard.rs
//!
//! The landing view: recent moods and goal progress.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use wellness_core::domain::{Goal, GoalProgress, MoodEntry, Session};

use crate::engine::{LiveView, SubscriptionManager};
use crate::state::AppState;

/// How many moods the dashboard shows and charts.
pub const DASHBOARD_MOOD_LIMIT: usize = 7;

pub struct DashboardView {
    moods: LiveView<MoodEntry>,
    goals: LiveView<Goal>,
    subscriptions: SubscriptionManager,
}

impl DashboardView {
    pub async fn open(app: Arc<AppState>, session: Session, scope: CancellationToken) -> Self {
        let mut subscriptions =
            SubscriptionManager::new(app.store.clone(), app.config.app_id.clone(), scope);
        let moods = LiveView::new();
        let goals = LiveView::new();
        subscriptions.subscribe(&session, None, moods.clone(), None).await;
        subscriptions.subscribe(&session, None, goals.clone(), None).await;
        Self { moods, goals, subscriptions }
    }

    pub fn moods(&self) -> &LiveView<MoodEntry> {
        &self.moods
    }

    pub fn goals(&self) -> &LiveView<Goal> {
        &self.goals
    }

    /// The most recent moods, newest first.
    pub async fn recent_moods(&self) -> Vec<MoodEntry> {
        self.moods.read(|v| v.window(DASHBOARD_MOOD_LIMIT).to_vec()).await
    }

    /// The "Recent Mood" slot.
    pub async fn latest_mood(&self) -> Option<MoodEntry> {
        self.moods.read(|v| v.first().cloned()).await
    }

    /// The most recent moods in chronological order, for the trend chart.
    pub async fn mood_trend(&self) -> Vec<MoodEntry> {
        self.moods.read(|v| v.chart_window(DASHBOARD_MOOD_LIMIT)).await
    }

    pub async fn goal_progress(&self) -> GoalProgress {
        self.goals.read(|v| GoalProgress::from_goals(v.entries())).await
    }

    pub fn subscriptions(&self) -> &SubscriptionManager {
        &self.subscriptions
    }

    pub async fn close(mut self) {
        self.subscriptions.shutdown().await;
    }
}
