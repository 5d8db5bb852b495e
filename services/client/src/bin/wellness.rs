//! services/client/src/bin/wellness.rs

use client_lib::{
    adapters::{InMemoryStore, LocalSessionProvider, PgDocumentStore},
    app::WellnessClient,
    config::Config,
    error::SyncResult,
    state::AppState,
    views::{crisis::CRISIS_RESOURCES, ActiveView, View},
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wellness_core::domain::Mood;
use wellness_core::ports::DocumentStore;

#[tokio::main]
async fn main() -> SyncResult<()> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting client for app '{}'...", config.app_id);

    // --- 2. Pick the Document Store ---
    let store: Arc<dyn DocumentStore> = match &config.database_url {
        Some(url) => {
            info!("Connecting to database...");
            let pg = PgDocumentStore::connect(url).await?;
            info!("Running database migrations...");
            pg.run_migrations().await?;
            info!("Database migrations complete.");
            Arc::new(pg)
        }
        None => {
            info!("No DATABASE_URL set, using the in-memory store.");
            Arc::new(InMemoryStore::new())
        }
    };

    // --- 3. Create Shared State & Sign In ---
    let state = Arc::new(AppState::new(store, Arc::new(LocalSessionProvider::new()), config));
    let mut client = WellnessClient::new(state);
    let session = client.sign_in().await?;
    info!("Session {} established.", session.id);

    // --- 4. Walk Through the Views ---
    if let ActiveView::Dashboard(dashboard) = client.current() {
        dashboard.moods().wait_until(|v| v.revision() > 0).await;
        let progress = dashboard.goal_progress().await;
        info!("Dashboard: {} of {} goals completed.", progress.completed, progress.total);
    }

    client.navigate(View::MoodTracker).await?;
    if let ActiveView::MoodTracker(tracker) = client.current() {
        tracker.log_mood(Mood::Calm).await;
        info!("Journal prompt: {}", tracker.journal_prompt());
        tracker.save_journal("Took a long walk after lunch.").await;
        tracker.moods().wait_until(|v| !v.is_empty()).await;
        for entry in tracker.recent_moods().await {
            info!("Mood on {}: {} ({})", entry.date, entry.mood.label(), entry.mood_score);
        }
    }

    client.navigate(View::Chatbot).await?;
    if let ActiveView::Chatbot(chat) = client.current() {
        if chat.send("I've been feeling a bit overwhelmed lately.").await {
            chat.messages().wait_until(|v| v.len() >= 2).await;
        } else {
            warn!("Chat message was not delivered.");
        }
        for message in chat.messages().entries().await {
            info!("[{:?}] {}", message.sender, message.content);
        }
    }

    client.navigate(View::Blogs).await?;
    if let ActiveView::Blogs(blogs) = client.current() {
        blogs.articles().wait_until(|v| !v.is_empty()).await;
        for article in blogs.articles().entries().await {
            info!("Article: {} by {} ({})", article.title, article.author, article.read_time);
        }
    }

    client.navigate(View::Crisis).await?;
    for resource in CRISIS_RESOURCES {
        info!("{}: {}", resource.name, resource.contact);
    }

    // --- 5. Tear Down ---
    client.sign_out().await?;
    info!("Walkthrough complete.");
    Ok(())
}
