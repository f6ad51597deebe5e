//! The hub driving real requests against the devserver.

mod common;

use std::time::Duration;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use chrono::Utc;

use moddash_devserver::{router, SharedStore, Store};
use moddash_proto::protocol::{Filter, NewPost, Period};
use moddash_sync::{FeedKey, FeedStatus, Scheduler, View};

fn sample(title: &str) -> NewPost {
    NewPost {
        title: title.into(),
        content: "body".into(),
        author: "mo".into(),
        category: "general".into(),
        server: "server1".into(),
    }
}

/// One item from two hours ago, one from ten days ago.
async fn two_item_store() -> SharedStore {
    let store = SharedStore::new(Store::new());
    let now = Utc::now();
    {
        let mut inner = store.inner.write().await;
        inner.create(sample("recent"), now - chrono::Duration::hours(2));
        inner.create(sample("older"), now - chrono::Duration::days(10));
    }
    store
}

async fn slow_day_queries(req: Request, next: Next) -> Response {
    if req.uri().query().is_some_and(|q| q.contains("period=day")) {
        tokio::time::sleep(Duration::from_millis(300)).await;
    }
    next.run(req).await
}

#[tokio::test]
async fn test_dashboard_mount_loads_every_panel() {
    let store = two_item_store().await;
    let addr = common::serve(router(store)).await;
    let mut live = common::live_hub(addr);

    live.hub.show(View::Dashboard);
    assert_eq!(live.hub.dashboard().unified_status(), FeedStatus::Loading);
    assert_eq!(live.pump(5).await, 5);

    let dash = live.hub.dashboard();
    assert_eq!(dash.unified_status(), FeedStatus::Ready);
    assert_eq!(dash.stats().data.map(|s| s.total), Some(1));
    assert_eq!(dash.servers().data.as_ref().map(|m| m.len()), Some(3));
    assert_eq!(dash.activity().data.as_ref().map(|a| a.len()), Some(7));
    assert!(live.hub.notifications().is_empty());
}

#[tokio::test]
async fn test_slow_superseded_period_never_lands() {
    let store = two_item_store().await;
    let app = router(store).layer(middleware::from_fn(slow_day_queries));
    let addr = common::serve(app).await;
    let mut live = common::live_hub(addr);

    live.hub.show(View::Dashboard);
    live.pump(5).await;

    live.hub.set_period(Period::Day);
    live.hub.set_period(Period::Month);
    let changed = live.pump(10).await;
    assert_eq!(changed, 5, "only the month responses may land");

    let dash = live.hub.dashboard();
    assert_eq!(dash.period(), Period::Month);
    assert_eq!(dash.stats().data.map(|s| s.total), Some(2));
    assert_eq!(dash.recent().data.as_ref().map(|r| r.len()), Some(2));
    assert_eq!(dash.activity().data.as_ref().map(|a| a.len()), Some(30));
}

#[tokio::test]
async fn test_switching_away_discards_in_flight_results() {
    let store = two_item_store().await;
    let app = router(store).layer(middleware::from_fn(slow_day_queries));
    let addr = common::serve(app).await;
    let mut live = common::live_hub(addr);

    live.hub.show(View::Dashboard);
    live.pump(5).await;
    live.hub.set_period(Period::Day);
    live.hub.show(View::Content);
    assert!(!live.timers[&FeedKey::Stats].is_running());
    assert!(live.timers[&FeedKey::ContentList].is_running());

    // 5 superseded dashboard responses plus the list's first load
    assert_eq!(live.pump(6).await, 1);
    assert_eq!(live.hub.dashboard().stats().data.map(|s| s.total), Some(1));
    assert_eq!(live.hub.list().items().len(), 2);
}

#[tokio::test]
async fn test_unreachable_backend_notifies_once_per_outage() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead = listener.local_addr().unwrap();
    drop(listener);
    let mut live = common::live_hub(dead);

    live.hub.show(View::Content);
    live.pump(1).await;
    live.hub.refresh();
    live.pump(1).await;
    live.hub.set_filter(Filter::Rejected);
    live.pump(1).await;

    let list = live.hub.list();
    assert_eq!(list.status(), FeedStatus::Error);
    assert!(list.items().is_empty());
    assert!(list
        .state()
        .error_message
        .as_deref()
        .is_some_and(|m| m.starts_with("Backend unreachable")));
    assert_eq!(live.hub.notifications().len(), 1);
}

#[tokio::test]
async fn test_landed_submission_refreshes_visible_list() {
    let store = two_item_store().await;
    let addr = common::serve(router(store.clone())).await;
    let mut live = common::live_hub(addr);

    live.hub.show(View::Content);
    live.pump(1).await;
    assert!(live.hub.submit().is_err());
    assert_eq!(live.hub.submission().inline_error(), Some("Please fill in all required fields"));

    {
        let form = &mut live.hub.submission_mut().form;
        form.title = "Fresh".into();
        form.content = "Brand new".into();
        form.author = "lee".into();
    }
    live.hub.submit().unwrap();
    // submission outcome, then the list refresh it triggers
    live.pump(2).await;

    assert_eq!(store.created_count(), 1);
    assert_eq!(live.hub.list().items().len(), 3);
    assert_eq!(live.hub.list().items()[0].title, "Fresh");
    assert!(live.hub.submission().form.title.is_empty());
    let titles: Vec<&str> = live
        .hub
        .notifications()
        .visible()
        .map(|n| n.event.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Content Submitted"]);
}
