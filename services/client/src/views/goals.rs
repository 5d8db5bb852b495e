//! services/client/src/views/goals.rs
//!
//! The goal list: add, toggle, delete.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use wellness_core::domain::{Goal, GoalProgress, Session};
use wellness_core::ports::Collection;

use crate::engine::{LiveView, SubscriptionManager};
use crate::records::{goal_completion_patch, GoalRecord};
use crate::state::AppState;

pub struct GoalsView {
    app: Arc<AppState>,
    session: Session,
    goals: LiveView<Goal>,
    subscriptions: SubscriptionManager,
}

impl GoalsView {
    pub async fn open(app: Arc<AppState>, session: Session, scope: CancellationToken) -> Self {
        let mut subscriptions =
            SubscriptionManager::new(app.store.clone(), app.config.app_id.clone(), scope);
        let goals = LiveView::new();
        subscriptions.subscribe(&session, None, goals.clone(), None).await;
        Self { app, session, goals, subscriptions }
    }

    pub fn goals(&self) -> &LiveView<Goal> {
        &self.goals
    }

    /// Adds an open goal. Blank titles are ignored.
    pub async fn add(&self, title: &str) -> Option<String> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        let path = self.app.path(&self.session, Collection::Goals);
        let record = GoalRecord::new(title, self.app.clock.now());
        self.app.writes().create(&path, &record).await
    }

    /// Flips the completion flag of `id` as the view currently shows it.
    ///
    /// The view itself is left alone; the flip shows up with the next snapshot.
    pub async fn toggle(&self, id: &str) -> bool {
        let Some(goal) = self.goals.read(|v| v.get(id).cloned()).await else {
            warn!("Cannot toggle goal {}: not in the current view.", id);
            return false;
        };
        let path = self.app.path(&self.session, Collection::Goals);
        let patch = goal_completion_patch(goal.toggled());
        self.app.writes().update(&path, id, patch).await
    }

    pub async fn delete(&self, id: &str) -> bool {
        let path = self.app.path(&self.session, Collection::Goals);
        self.app.writes().delete(&path, id).await
    }

    pub async fn progress(&self) -> GoalProgress {
        self.goals.read(|v| GoalProgress::from_goals(v.entries())).await
    }

    pub async fn close(mut self) {
        self.subscriptions.shutdown().await;
    }
}
