//! Failure mapping at the gateway, against real sockets.

mod common;

use std::time::{Duration, Instant};

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

use moddash_devserver::{router, SharedStore, Store};
use moddash_proto::protocol::{Filter, NewPost, Period};
use moddash_sync::submission::{submit, SubmissionForm};
use moddash_sync::{Gateway, HttpError, SubmitError, ValidationError};

#[tokio::test]
async fn test_non_success_status_maps_to_status_error() {
    let app = Router::new().route(
        "/api/activity",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
    );
    let addr = common::serve(app).await;
    let gw = common::gateway(addr);

    let err = gw.fetch_status().await.unwrap_err();
    assert_eq!(err.status(), 404);

    let err = gw.fetch_activity(Period::Day).await.unwrap_err();
    assert_eq!(
        err,
        HttpError::Status {
            status: 503,
            status_text: "Service Unavailable".into()
        }
    );
    assert_eq!(err.summary(), "Server returned 503 Service Unavailable");
}

#[tokio::test]
async fn test_non_json_body_is_decode_failure() {
    let app = Router::new().route("/api/status", get(|| async { "<html>oops</html>" }));
    let addr = common::serve(app).await;

    let err = common::gateway(addr).fetch_status().await.unwrap_err();
    assert!(matches!(err, HttpError::Decode { .. }));
    assert_eq!(err.status(), HttpError::DECODE_STATUS);
}

#[tokio::test]
async fn test_refused_connection_is_network_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = common::gateway(addr).fetch_status().await.unwrap_err();
    assert!(matches!(err, HttpError::Network { .. }));
    assert_eq!(err.status(), 0);
}

#[tokio::test]
async fn test_hung_backend_times_out() {
    let app = Router::new().route(
        "/api/status",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "{}"
        }),
    );
    let addr = common::serve(app).await;
    let gw = Gateway::new(&common::backend(addr, 1)).unwrap();

    let started = Instant::now();
    let err = gw.fetch_status().await.unwrap_err();
    assert!(matches!(err, HttpError::Network { .. }));
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn test_posts_round_trip_through_devserver() {
    let store = SharedStore::new(Store::new());
    let addr = common::serve(router(store.clone())).await;
    let gw = common::gateway(addr);

    let created = gw
        .create_post(&NewPost {
            title: "Weekly digest".into(),
            content: "Links".into(),
            author: "rin".into(),
            category: "news".into(),
            server: "server2".into(),
        })
        .await
        .unwrap();
    assert_eq!(store.created_count(), 1);

    let listed = gw
        .fetch_posts(Some(Period::Day), Some(Filter::Pending))
        .await
        .unwrap();
    assert_eq!(listed.posts.len(), 1);
    assert_eq!(listed.posts[0].id, created.id);
    assert_eq!(listed.stats.pending, 1);

    let status = gw.fetch_status().await.unwrap();
    assert_eq!(status.len(), 3);
    assert!(status.values().all(|s| s.is_online()));

    let unfiltered = gw.fetch_posts(None, None).await.unwrap();
    assert_eq!(unfiltered.stats.total, 1);
}

#[tokio::test]
async fn test_invalid_form_never_posts() {
    let store = SharedStore::new(Store::new());
    let addr = common::serve(router(store.clone())).await;
    let gw = common::gateway(addr);

    let mut form = SubmissionForm::default();
    form.title = "Only a title".into();
    form.content = "   ".into();

    let err = submit(&gw, &form).await.unwrap_err();
    assert_eq!(
        err,
        SubmitError::Validation(ValidationError::MissingField { field: "content" })
    );
    assert_eq!(store.created_count(), 0);

    form.content = "Now with a body".into();
    form.author = "kit".into();
    let post = submit(&gw, &form).await.unwrap();
    assert_eq!(post.title, "Only a title");
    assert_eq!(store.created_count(), 1);
}
