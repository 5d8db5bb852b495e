#![allow(dead_code)]

use client_lib::{adapters::InMemoryStore, config::Config, state::AppState};
use client_lib::adapters::LocalSessionProvider;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use wellness_core::domain::Session;

pub struct Harness {
    pub store: InMemoryStore,
    pub app: Arc<AppState>,
}

pub fn config() -> Config {
    Config {
        responder_seed: Some(7),
        consultation_reply_delay: Duration::from_millis(20),
        ..Config::default()
    }
}

pub fn harness(config: Config) -> Harness {
    let store = InMemoryStore::new();
    let app = Arc::new(AppState::new(
        Arc::new(store.clone()),
        Arc::new(LocalSessionProvider::new()),
        Arc::new(config),
    ));
    Harness { store, app }
}

pub fn session(id: &str) -> Session {
    Session { id: id.to_string(), anonymous: false }
}

/// Awaits `f`, failing the test if it takes unreasonably long.
pub async fn settle<F: Future>(f: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(5), f)
        .await
        .expect("condition was not reached in time")
}
