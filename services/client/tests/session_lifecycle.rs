mod common;

use client_lib::app::WellnessClient;
use client_lib::config::Config;
use client_lib::error::SyncError;
use client_lib::views::{ActiveView, View};
use common::{config, harness, settle};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wellness_core::domain::{Mood, ThreadSender};
use wellness_core::ports::{
    Collection, CollectionPath, DocumentStore, FieldFilter, Query, SessionProvider,
};

#[tokio::test]
async fn views_that_need_a_session_refuse_to_open_without_one() {
    let h = harness(config());
    let mut client = WellnessClient::new(h.app.clone());
    assert_eq!(client.view(), View::Auth);

    let err = client.navigate(View::Goals).await.unwrap_err();
    assert!(matches!(err, SyncError::AuthUnavailable));
    assert_eq!(client.view(), View::Auth);

    client.navigate(View::Crisis).await.unwrap();
    assert_eq!(client.view(), View::Crisis);
    assert_eq!(h.store.listener_count(), 0);
}

#[tokio::test]
async fn sign_in_uses_the_token_and_falls_back_to_anonymous() {
    let h = harness(Config { initial_auth_token: Some("user-9".to_string()), ..config() });
    let mut client = WellnessClient::new(h.app.clone());
    let session = client.sign_in().await.unwrap();
    assert_eq!(session.id, "user-9");
    assert!(!session.anonymous);
    assert_eq!(client.view(), View::Dashboard);

    let h = harness(Config { initial_auth_token: Some("not/usable".to_string()), ..config() });
    let mut client = WellnessClient::new(h.app.clone());
    let session = client.sign_in().await.unwrap();
    assert!(session.anonymous);
    assert_eq!(client.session(), Some(&session));
}

#[tokio::test]
async fn logged_mood_becomes_the_dashboards_most_recent() {
    let h = harness(config());
    let mut client = WellnessClient::new(h.app.clone());
    client.sign_in().await.unwrap();

    client.navigate(View::MoodTracker).await.unwrap();
    let ActiveView::MoodTracker(tracker) = client.current() else {
        panic!("expected the mood tracker");
    };
    tracker.log_mood(Mood::Anxious).await.unwrap();
    settle(tracker.moods().wait_until(|v| !v.is_empty())).await;

    client.navigate(View::Dashboard).await.unwrap();
    let ActiveView::Dashboard(dashboard) = client.current() else {
        panic!("expected the dashboard");
    };
    settle(dashboard.moods().wait_until(|v| !v.is_empty())).await;
    let latest = dashboard.latest_mood().await.unwrap();
    assert_eq!(latest.mood, Mood::Anxious);
    assert_eq!(latest.mood_score, 2);
    assert_eq!(latest.date, latest.created_at.date_naive());
    assert!(chrono::Utc::now() - latest.created_at < chrono::Duration::seconds(60));
}

#[tokio::test]
async fn sign_out_tears_down_every_subscription() {
    let h = harness(Config { consultation_reply_delay: Duration::from_millis(300), ..config() });
    let mut client = WellnessClient::new(h.app.clone());
    let session = client.sign_in().await.unwrap();
    let ActiveView::Dashboard(dashboard) = client.current() else {
        panic!("expected the dashboard");
    };
    settle(dashboard.goals().wait_until(|v| v.revision() >= 1)).await;
    assert!(h.store.listener_count() > 0);

    client.navigate(View::Consultations).await.unwrap();
    let ActiveView::Consultations(view) = client.current_mut() else {
        panic!("expected consultations");
    };
    let id = view.book().await.unwrap();
    view.open_thread(&id).await;
    assert!(view.send("hello?").await);
    let pending = view.take_pending_replies();
    assert_eq!(pending.len(), 1);
    let scope = client.session_scope().clone();

    client.sign_out().await.unwrap();
    assert_eq!(client.view(), View::Auth);
    assert!(client.session().is_none());
    assert!(scope.is_cancelled());
    assert_eq!(h.store.listener_count(), 0);
    assert!(h.app.sessions.current().is_none());

    for reply in pending {
        assert!(!reply.await.unwrap());
    }
    let path = CollectionPath::private("demo-app", &session, Collection::ConsultationMessages);
    let thread = Query::new(path).filtered(FieldFilter::eq("consultationId", id.as_str()));
    let docs = h.store.read(&thread).await.unwrap();
    assert_eq!(docs.len(), 1);

    assert!(matches!(client.navigate(View::Dashboard).await, Err(SyncError::AuthUnavailable)));
}

#[tokio::test(start_paused = true)]
async fn pending_reply_never_lands_after_the_thread_changes() {
    let h = harness(Config { consultation_reply_delay: Duration::from_secs(2), ..config() });
    let session = common::session("u1");
    let mut view = client_lib::views::ConsultationsView::open(
        h.app.clone(),
        session.clone(),
        CancellationToken::new(),
    )
    .await;
    let a = view.book().await.unwrap();
    let b = view.book().await.unwrap();

    view.open_thread(&a).await;
    assert!(view.send("are you there?").await);
    let cancelled = view.take_pending_replies();
    view.close_thread().await;
    let thread_b = view.open_thread(&b).await;

    tokio::time::sleep(Duration::from_secs(5)).await;
    for reply in cancelled {
        assert!(!reply.await.unwrap());
    }

    let path = CollectionPath::private("demo-app", &session, Collection::ConsultationMessages);
    let thread_a = Query::new(path.clone()).filtered(FieldFilter::eq("consultationId", a.as_str()));
    let docs = h.store.read(&thread_a).await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].data["sender"], "user");
    settle(thread_b.wait_until(|v| v.revision() >= 1)).await;
    assert!(thread_b.entries().await.is_empty());

    // The reply in the thread that stays open does arrive.
    assert!(view.send("hello B").await);
    for reply in view.take_pending_replies() {
        assert!(reply.await.unwrap());
    }
    settle(thread_b.wait_until(|v| v.len() == 2)).await;
    let messages = thread_b.entries().await;
    assert_eq!(messages[1].sender, ThreadSender::Counterpart);
    assert_eq!(messages[1].consultation_id, b);

    view.close().await;
}

#[tokio::test(start_paused = true)]
async fn switching_threads_directly_cancels_the_pending_reply() {
    let h = harness(Config { consultation_reply_delay: Duration::from_secs(2), ..config() });
    let session = common::session("u1");
    let mut view = client_lib::views::ConsultationsView::open(
        h.app.clone(),
        session.clone(),
        CancellationToken::new(),
    )
    .await;
    let a = view.book().await.unwrap();
    let b = view.book().await.unwrap();

    let thread_a = view.open_thread(&a).await;
    assert!(view.send("anyone?").await);
    let pending = view.take_pending_replies();
    let thread_b = view.open_thread(&b).await;
    assert_eq!(view.open_consultation(), Some(b.as_str()));

    tokio::time::sleep(Duration::from_secs(5)).await;
    for reply in pending {
        assert!(!reply.await.unwrap());
    }

    let path = CollectionPath::private("demo-app", &session, Collection::ConsultationMessages);
    let query_a = Query::new(path).filtered(FieldFilter::eq("consultationId", a.as_str()));
    let docs = h.store.read(&query_a).await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].data["sender"], "user");
    assert!(thread_a.entries().await.iter().all(|m| m.sender == ThreadSender::User));

    settle(thread_b.wait_until(|v| v.revision() >= 1)).await;
    assert!(thread_b.entries().await.is_empty());
    assert_eq!(view.subscriptions().live_count(), 2);
    view.close().await;
}
