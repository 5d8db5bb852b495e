//! services/client/src/views/blogs.rs
//!
//! The shared article library. The first empty snapshot seeds the sample articles.

use chrono::NaiveDate;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::info;
use wellness_core::domain::{Article, Session};
use wellness_core::ports::{Collection, Document};

use crate::engine::{LiveView, SeedOutcome, SnapshotHook, SubscriptionManager};
use crate::records::ArticleRecord;
use crate::state::AppState;

fn article(
    title: &str,
    summary: &str,
    content: &str,
    author: &str,
    (y, m, d): (i32, u32, u32),
    read_time: &str,
) -> ArticleRecord {
    ArticleRecord {
        title: title.to_string(),
        summary: summary.to_string(),
        content: content.to_string(),
        author: author.to_string(),
        date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
        read_time: read_time.to_string(),
    }
}

/// The articles written into an empty library.
pub fn sample_articles() -> Vec<ArticleRecord> {
    vec![
        article(
            "Understanding Anxiety: A Comprehensive Guide",
            "Learn about anxiety disorders, their symptoms, and effective management strategies.",
            "Anxiety is a natural human emotion that everyone experiences from time to time. \
             However, when anxiety becomes persistent, excessive, and interferes with daily life, \
             it may be classified as an anxiety disorder...",
            "Dr. Sarah Johnson",
            (2024, 1, 15),
            "8 min read",
        ),
        article(
            "The Power of Mindfulness in Daily Life",
            "Discover how mindfulness practices can improve your mental well-being and reduce stress.",
            "Mindfulness is the practice of being fully present and engaged in the current moment, \
             without judgment. This ancient practice has been scientifically proven to reduce \
             stress, improve focus, and enhance overall well-being...",
            "Dr. Michael Chen",
            (2024, 1, 12),
            "6 min read",
        ),
        article(
            "Building Resilience Through Difficult Times",
            "Practical strategies for developing emotional resilience and coping with life's challenges.",
            "Resilience is the ability to bounce back from adversity, adapt to change, and keep \
             going in the face of hardship. While some people seem naturally resilient, it's \
             actually a skill that can be developed...",
            "Dr. Emily Rodriguez",
            (2024, 1, 10),
            "10 min read",
        ),
    ]
}

pub struct BlogsView {
    articles: LiveView<Article>,
    selected: Mutex<Option<String>>,
    subscriptions: SubscriptionManager,
}

impl BlogsView {
    pub async fn open(app: Arc<AppState>, session: Session, scope: CancellationToken) -> Self {
        let mut subscriptions =
            SubscriptionManager::new(app.store.clone(), app.config.app_id.clone(), scope);
        let articles = LiveView::new();
        let hook = seed_hook(app.clone(), &session);
        subscriptions.subscribe(&session, None, articles.clone(), Some(hook)).await;
        Self { articles, selected: Mutex::new(None), subscriptions }
    }

    pub fn articles(&self) -> &LiveView<Article> {
        &self.articles
    }

    /// Opens the reader on `id`. Returns the article if it is in the view.
    pub async fn select(&self, id: &str) -> Option<Article> {
        let found = self.articles.read(|v| v.get(id).cloned()).await?;
        *self.selected.lock().unwrap_or_else(|e| e.into_inner()) = Some(found.id.clone());
        Some(found)
    }

    /// The article in the reader, resolved against the latest snapshot.
    pub async fn selected(&self) -> Option<Article> {
        let id = self.selected.lock().unwrap_or_else(|e| e.into_inner()).clone()?;
        self.articles.read(|v| v.get(&id).cloned()).await
    }

    pub fn clear_selection(&self) {
        self.selected.lock().unwrap_or_else(|e| e.into_inner()).take();
    }

    pub async fn close(mut self) {
        self.subscriptions.shutdown().await;
    }
}

/// Claims the seed latch from inside the snapshot callback and hands the writes
/// to a task, so a second empty snapshot arriving before the first write echoes
/// back finds the latch already taken.
fn seed_hook(app: Arc<AppState>, session: &Session) -> SnapshotHook {
    let path = app.path(session, Collection::Articles);
    Arc::new(move |snapshot: &[Document]| {
        let claim = match app.seed_guard.claim(&path, snapshot) {
            Ok(claim) => claim,
            Err(_) => return,
        };
        let writes = app.writes();
        tokio::spawn(async move {
            if let SeedOutcome::Seeded { written } = claim.write_all(&writes, &sample_articles()).await {
                info!("Article library seeded with {} articles.", written);
            }
        });
    })
}
