use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use moddash_proto::protocol::{
    ActivityPoint, Category, Filter, NewPost, Period, Post, PostsResponse, ServerStatusMap,
    WorkerTiming,
};

use crate::store::SharedStore;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unknown period {0:?}")]
    BadPeriod(String),
    #[error("unknown filter {0:?}")]
    BadFilter(String),
    #[error("{0} is required")]
    MissingField(&'static str),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!("HTTP API: rejected request: {}", self);
        let body = serde_json::json!({ "error": self.to_string() });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PostsQuery {
    period: Option<String>,
    filter: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    period: Option<String>,
}

fn parse_period(raw: Option<&str>) -> Result<Option<Period>, ApiError> {
    match raw {
        None | Some("") => Ok(None),
        Some(s) => Period::parse(s)
            .map(Some)
            .ok_or_else(|| ApiError::BadPeriod(s.to_string())),
    }
}

fn parse_filter(raw: Option<&str>) -> Result<Option<Filter>, ApiError> {
    match raw {
        None | Some("") => Ok(None),
        Some(s) => Filter::parse(s)
            .map(Some)
            .ok_or_else(|| ApiError::BadFilter(s.to_string())),
    }
}

/// All backend routes over `store`.
pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/api/posts", get(list_posts).post(create_post))
        .route("/api/status", get(server_status))
        .route("/api/activity", get(activity))
        .route("/api/processing-times", get(processing_times))
        .route("/api/categories", get(categories))
        .layer(CorsLayer::permissive())
        .with_state(store)
}

pub fn start_server(
    bind_address: String,
    port: u16,
    store: SharedStore,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let app = router(store);
        let addr = format!("{}:{}", bind_address, port);
        let listener = match TcpListener::bind(&addr).await {
            Ok(l) => l,
            Err(e) => {
                error!("Failed to bind HTTP server to {}: {}", addr, e);
                return;
            }
        };

        info!("Moderation API listening on http://{}", addr);

        if let Err(e) = axum::serve(listener, app).await {
            error!("HTTP server error: {}", e);
        }
    })
}

async fn list_posts(
    State(store): State<SharedStore>,
    Query(q): Query<PostsQuery>,
) -> Result<Json<PostsResponse>, ApiError> {
    let period = parse_period(q.period.as_deref())?;
    let filter = parse_filter(q.filter.as_deref())?;
    let (posts, stats) = store.inner.read().await.query(period, filter, Utc::now());
    Ok(Json(PostsResponse { posts, stats }))
}

async fn create_post(
    State(store): State<SharedStore>,
    Json(body): Json<NewPost>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let required = [
        ("title", &body.title),
        ("content", &body.content),
        ("author", &body.author),
    ];
    if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
        return Err(ApiError::MissingField(field));
    }
    let post = store.inner.write().await.create(body, Utc::now());
    store.record_create();
    info!("HTTP API: created post {} on {}", post.id, post.server);
    Ok((StatusCode::CREATED, Json(post)))
}

async fn server_status(State(store): State<SharedStore>) -> Json<ServerStatusMap> {
    Json(store.inner.read().await.server_status())
}

async fn activity(
    State(store): State<SharedStore>,
    Query(q): Query<PeriodQuery>,
) -> Result<Json<Vec<ActivityPoint>>, ApiError> {
    let period = parse_period(q.period.as_deref())?.unwrap_or_default();
    Ok(Json(store.inner.read().await.activity(period, Utc::now())))
}

async fn processing_times(
    State(store): State<SharedStore>,
    Query(q): Query<PeriodQuery>,
) -> Result<Json<Vec<WorkerTiming>>, ApiError> {
    let period = parse_period(q.period.as_deref())?.unwrap_or_default();
    Ok(Json(
        store.inner.read().await.processing_times(period, Utc::now()),
    ))
}

async fn categories(
    State(store): State<SharedStore>,
    Query(q): Query<PeriodQuery>,
) -> Result<Json<Vec<Category>>, ApiError> {
    let period = parse_period(q.period.as_deref())?.unwrap_or_default();
    Ok(Json(store.inner.read().await.categories(period, Utc::now())))
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::store::Store;

    async fn call(store: &SharedStore, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let resp = router(store.clone()).oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post_json(body: serde_json::Value) -> Request<Body> {
        Request::post("/api/posts")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let store = SharedStore::new(Store::new());
        let (status, created) = call(
            &store,
            post_json(serde_json::json!({
                "title": "hello", "content": "world", "author": "ana",
                "category": "news", "server": "server1"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["status"], "pending");
        assert_eq!(store.created_count(), 1);

        let (status, body) = call(&store, get("/api/posts?period=day&filter=pending")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["posts"].as_array().map(|a| a.len()), Some(1));
        assert_eq!(body["stats"]["total"], 1);
        assert!(body["posts"][0]["createdAt"].is_string());
    }

    #[tokio::test]
    async fn test_blank_title_is_rejected() {
        let store = SharedStore::new(Store::new());
        let (status, body) = call(
            &store,
            post_json(serde_json::json!({
                "title": "  ", "content": "x", "author": "ana",
                "category": "general", "server": "server1"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "title is required");
        assert_eq!(store.created_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_period_is_bad_request() {
        let store = SharedStore::new(Store::new());
        let (status, _) = call(&store, get("/api/activity?period=decade")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_status_reports_every_server() {
        let store = SharedStore::new(Store::new());
        store.inner.write().await.set_offline("server3", true);
        let (status, body) = call(&store, get("/api/status")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["server1"], "idle");
        assert_eq!(body["server3"], "offline");
    }

    #[tokio::test]
    async fn test_series_endpoints_default_to_week() {
        let store = SharedStore::new(Store::new());
        let (_, activity) = call(&store, get("/api/activity")).await;
        assert_eq!(activity.as_array().map(|a| a.len()), Some(7));
        let (status, times) = call(&store, get("/api/processing-times?period=month")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(times.as_array().is_some());
        let (_, cats) = call(&store, get("/api/categories?period=year")).await;
        assert!(cats.as_array().is_some_and(|a| a.is_empty()));
    }
}
