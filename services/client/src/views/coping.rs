//! services/client/src/views/coping.rs
//!
//! Gratitude entries, the rotating affirmation and the guided exercises.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use wellness_core::domain::{GratitudeEntry, Session};
use wellness_core::ports::Collection;

use crate::engine::{LiveView, SubscriptionManager};
use crate::records::DatedTextRecord;
use crate::state::AppState;

pub const AFFIRMATIONS: [&str; 8] = [
    "I am worthy of love and respect",
    "I have the strength to overcome challenges",
    "I am capable of creating positive change in my life",
    "I deserve happiness and peace",
    "I am resilient and can handle whatever comes my way",
    "I choose to focus on what I can control",
    "I am grateful for this moment",
    "I am enough, just as I am",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Breathing,
    Meditation,
    Cbt,
    Dbt,
    Mindfulness,
}

impl StrategyKind {
    pub fn tag(self) -> &'static str {
        match self {
            StrategyKind::Breathing => "BREATHING",
            StrategyKind::Meditation => "MEDITATION",
            StrategyKind::Cbt => "CBT",
            StrategyKind::Dbt => "DBT",
            StrategyKind::Mindfulness => "MINDFULNESS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopingStrategy {
    pub title: &'static str,
    pub description: &'static str,
    pub kind: StrategyKind,
}

pub const COPING_STRATEGIES: [CopingStrategy; 5] = [
    CopingStrategy {
        title: "5-Minute Calming Breath",
        description: "Deep breathing exercise to reduce anxiety and stress",
        kind: StrategyKind::Breathing,
    },
    CopingStrategy {
        title: "Body Scan Meditation",
        description: "Progressive relaxation technique for physical and mental tension",
        kind: StrategyKind::Meditation,
    },
    CopingStrategy {
        title: "Thought Challenging Worksheet",
        description: "CBT technique to identify and reframe negative thoughts",
        kind: StrategyKind::Cbt,
    },
    CopingStrategy {
        title: "Distress Tolerance Skills",
        description: "DBT techniques for managing intense emotions",
        kind: StrategyKind::Dbt,
    },
    CopingStrategy {
        title: "Mindful Walking",
        description: "Grounding exercise combining movement and mindfulness",
        kind: StrategyKind::Mindfulness,
    },
];

/// Index of the affirmation on screen after `elapsed`, advancing once per
/// `interval` and wrapping around the list.
pub fn affirmation_at(elapsed: Duration, interval: Duration) -> usize {
    if interval.is_zero() {
        return 0;
    }
    let ticks = elapsed.as_millis() / interval.as_millis().max(1);
    (ticks % AFFIRMATIONS.len() as u128) as usize
}

pub struct CopingView {
    app: Arc<AppState>,
    session: Session,
    gratitude: LiveView<GratitudeEntry>,
    opened_at: Instant,
    subscriptions: SubscriptionManager,
}

impl CopingView {
    pub async fn open(app: Arc<AppState>, session: Session, scope: CancellationToken) -> Self {
        let mut subscriptions =
            SubscriptionManager::new(app.store.clone(), app.config.app_id.clone(), scope);
        let gratitude = LiveView::new();
        subscriptions.subscribe(&session, None, gratitude.clone(), None).await;
        Self { app, session, gratitude, opened_at: Instant::now(), subscriptions }
    }

    pub fn gratitude(&self) -> &LiveView<GratitudeEntry> {
        &self.gratitude
    }

    /// Records a gratitude entry for today. Blank text is ignored.
    pub async fn add_gratitude(&self, content: &str) -> Option<String> {
        let content = content.trim();
        if content.is_empty() {
            return None;
        }
        let path = self.app.path(&self.session, Collection::GratitudeEntries);
        let record = DatedTextRecord::new(content, self.app.clock.now());
        self.app.writes().create(&path, &record).await
    }

    /// The affirmation currently on screen. The rotation restarts whenever
    /// the view is opened.
    pub fn current_affirmation(&self) -> &'static str {
        let index = affirmation_at(self.opened_at.elapsed(), self.app.config.affirmation_interval);
        AFFIRMATIONS[index]
    }

    pub fn strategies(&self) -> &'static [CopingStrategy] {
        &COPING_STRATEGIES
    }

    pub async fn close(mut self) {
        self.subscriptions.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affirmation_advances_once_per_interval_and_wraps() {
        let interval = Duration::from_secs(10);
        assert_eq!(affirmation_at(Duration::ZERO, interval), 0);
        assert_eq!(affirmation_at(Duration::from_millis(9_999), interval), 0);
        assert_eq!(affirmation_at(Duration::from_secs(10), interval), 1);
        assert_eq!(affirmation_at(Duration::from_secs(75), interval), 7);
        assert_eq!(affirmation_at(Duration::from_secs(80), interval), 0);
    }

    #[test]
    fn zero_interval_pins_the_first_affirmation() {
        assert_eq!(affirmation_at(Duration::from_secs(30), Duration::ZERO), 0);
    }

    #[test]
    fn strategy_tags_are_upper_case() {
        let tags: Vec<_> = COPING_STRATEGIES.iter().map(|s| s.kind.tag()).collect();
        assert_eq!(tags, ["BREATHING", "MEDITATION", "CBT", "DBT", "MINDFULNESS"]);
    }
}
