//! Integration tests for PgDocumentStore.
//! Run with: DATABASE_URL=... cargo test -p client --test pg_store -- --ignored pg_

use client_lib::adapters::PgDocumentStore;
use futures::StreamExt;
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;
use wellness_core::domain::Session;
use wellness_core::ports::{
    Collection, CollectionPath, DocumentStore, FieldFilter, PortError, Query, SnapshotStream,
};

async fn create_pg_store() -> PgDocumentStore {
    let url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for PgDocumentStore integration tests");
    let store = PgDocumentStore::connect(&url).await.expect("Failed to connect to PostgreSQL");
    store.run_migrations().await.expect("Failed to run migrations");
    store
}

/// A private collection under a fresh app id, so tests never see each other's rows.
fn unique_path(collection: Collection) -> CollectionPath {
    let session = Session { id: "pg-test-user".to_string(), anonymous: false };
    CollectionPath::private(&format!("test-{}", Uuid::new_v4()), &session, collection)
}

async fn next_snapshot(stream: &mut SnapshotStream) -> Vec<String> {
    let snapshot = tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await
        .expect("no snapshot within five seconds")
        .expect("stream ended")
        .expect("snapshot failed");
    snapshot.into_iter().map(|d| d.data["content"].as_str().unwrap_or_default().to_string()).collect()
}

#[tokio::test]
#[ignore]
async fn pg_read_filters_and_orders() {
    let store = create_pg_store().await;
    let path = unique_path(Collection::ConsultationMessages);
    for (thread, content, ts) in [
        ("a", "third", "2026-03-04T10:00:03.000000Z"),
        ("b", "other", "2026-03-04T10:00:00.000000Z"),
        ("a", "first", "2026-03-04T10:00:01.000000Z"),
        ("a", "second", "2026-03-04T10:00:02.000000Z"),
    ] {
        let doc = json!({ "consultationId": thread, "content": content, "timestamp": ts });
        store.create(&path, doc).await.unwrap();
    }

    let thread_a = Query::new(path.clone())
        .filtered(FieldFilter::eq("consultationId", "a"))
        .ordered_by(Collection::ConsultationMessages.ordering());
    let docs = store.read(&thread_a).await.unwrap();
    let contents: Vec<_> = docs.iter().map(|d| d.data["content"].as_str().unwrap()).collect();
    assert_eq!(contents, ["first", "second", "third"]);

    let all = store.read(&Query::new(path)).await.unwrap();
    assert_eq!(all.len(), 4);
    assert!(all.windows(2).all(|w| w[0].id < w[1].id), "ties fall back to id order");
}

#[tokio::test]
#[ignore]
async fn pg_update_merges_and_unknown_ids() {
    let store = create_pg_store().await;
    let path = unique_path(Collection::Goals);
    let id = store.create(&path, json!({ "title": "Stretch", "completed": false })).await.unwrap();

    store.update(&path, &id, json!({ "completed": true })).await.unwrap();
    let docs = store.read(&Query::new(path.clone())).await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, id);
    assert_eq!(docs[0].data, json!({ "title": "Stretch", "completed": true }));

    let missing = store.update(&path, "no-such-goal", json!({ "completed": true })).await;
    assert!(matches!(missing, Err(PortError::NotFound(_))));
    let not_an_object = store.update(&path, &id, json!(true)).await;
    assert!(matches!(not_an_object, Err(PortError::InvalidPayload(_))));

    store.delete(&path, "no-such-goal").await.unwrap();
    assert_eq!(store.read(&Query::new(path.clone())).await.unwrap().len(), 1);
    store.delete(&path, &id).await.unwrap();
    assert!(store.read(&Query::new(path)).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore]
async fn pg_live_query_follows_matching_writes() {
    let store = create_pg_store().await;
    let path = unique_path(Collection::ConsultationMessages);
    let thread_a = Query::new(path.clone())
        .filtered(FieldFilter::eq("consultationId", "a"))
        .ordered_by(Collection::ConsultationMessages.ordering());
    let mut stream = store.subscribe(thread_a).await.unwrap();
    assert!(next_snapshot(&mut stream).await.is_empty());

    let first = json!({ "consultationId": "a", "content": "hello", "timestamp": "2026-03-04T10:00:01.000000Z" });
    store.create(&path, first).await.unwrap();
    assert_eq!(next_snapshot(&mut stream).await, ["hello"]);

    // Writes that leave the filtered result untouched produce no snapshot.
    let elsewhere = unique_path(Collection::ConsultationMessages);
    store.create(&elsewhere, json!({ "consultationId": "a", "content": "x" })).await.unwrap();
    let other_thread = json!({ "consultationId": "b", "content": "y", "timestamp": "2026-03-04T10:00:02.000000Z" });
    store.create(&path, other_thread).await.unwrap();

    let reply = json!({ "consultationId": "a", "content": "hi!", "timestamp": "2026-03-04T10:00:03.000000Z" });
    store.create(&path, reply).await.unwrap();
    assert_eq!(next_snapshot(&mut stream).await, ["hello", "hi!"]);
}
