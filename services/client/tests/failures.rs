mod common;

use client_lib::engine::ViewStatus;
use client_lib::views::{ConsultationsView, DashboardView, GoalsView};
use common::{config, harness, session, settle};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn rejected_write_leaves_the_view_untouched() {
    let h = harness(config());
    let goals = GoalsView::open(h.app.clone(), session("u1"), CancellationToken::new()).await;
    settle(goals.goals().wait_until(|v| v.revision() == 1)).await;

    h.store.set_fail_writes(true);
    assert!(goals.add("Drink more water").await.is_none());
    assert!(!goals.delete("missing").await);
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(goals.goals().read(|v| v.revision()).await, 1);
    assert!(goals.goals().entries().await.is_empty());
    assert_eq!(goals.goals().status().await, ViewStatus::Ready);

    h.store.set_fail_writes(false);
    assert!(goals.add("Drink more water").await.is_some());
    settle(goals.goals().wait_until(|v| v.len() == 1)).await;
    goals.close().await;
}

#[tokio::test]
async fn toggling_an_unknown_goal_writes_nothing() {
    let h = harness(config());
    let goals = GoalsView::open(h.app.clone(), session("u1"), CancellationToken::new()).await;
    assert!(!goals.toggle("nope").await);
    assert_eq!(h.store.write_count(), 0);
    goals.close().await;
}

#[tokio::test]
async fn rejected_subscription_marks_the_view_failed() {
    let h = harness(config());
    h.store.set_fail_subscriptions(true);
    let goals = GoalsView::open(h.app.clone(), session("u1"), CancellationToken::new()).await;

    settle(goals.goals().wait_until(|v| matches!(v.status(), ViewStatus::Failed(_)))).await;
    assert!(goals.goals().entries().await.is_empty());
    goals.close().await;
}

#[tokio::test]
async fn dropped_stream_fails_the_view_and_ends_the_subscription() {
    let h = harness(config());
    let dashboard = DashboardView::open(h.app.clone(), session("u1"), CancellationToken::new()).await;
    settle(dashboard.moods().wait_until(|v| v.status() == &ViewStatus::Ready)).await;
    settle(dashboard.goals().wait_until(|v| v.status() == &ViewStatus::Ready)).await;

    h.store.sever_subscriptions();
    settle(dashboard.moods().wait_until(|v| matches!(v.status(), ViewStatus::Failed(_)))).await;
    settle(dashboard.goals().wait_until(|v| matches!(v.status(), ViewStatus::Failed(_)))).await;
    settle(async {
        while dashboard.subscriptions().live_count() > 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert_eq!(h.store.listener_count(), 0);
    dashboard.close().await;
}

#[tokio::test]
async fn reopening_a_failed_thread_subscribes_again() {
    let h = harness(config());
    let mut view = ConsultationsView::open(h.app.clone(), session("u1"), CancellationToken::new()).await;
    let id = view.book().await.unwrap();
    settle(view.consultations().wait_until(|v| v.len() == 1)).await;

    h.store.set_fail_subscriptions(true);
    let failed = view.open_thread(&id).await;
    settle(failed.wait_until(|v| matches!(v.status(), ViewStatus::Failed(_)))).await;
    settle(async {
        while view.subscriptions().live_count() > 1 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;

    h.store.set_fail_subscriptions(false);
    let reopened = view.open_thread(&id).await;
    settle(reopened.wait_until(|v| v.status() == &ViewStatus::Ready)).await;
    assert!(matches!(failed.status().await, ViewStatus::Failed(_)));
    assert_eq!(view.subscriptions().live_count(), 2);
    assert_eq!(view.open_consultation(), Some(id.as_str()));

    assert!(view.send("still there?").await);
    settle(reopened.wait_until(|v| !v.is_empty())).await;
    view.close().await;
}
