//! Request gateway: parameterized GETs (and the one POST) against the
//! moderation backend.
//!
//! Every failure is folded into [`HttpError`] here; nothing retries at this
//! layer.  The per-request timeout comes from `BackendConfig` so a hung
//! backend surfaces as a network error instead of stalling a feed.

use anyhow::Context;
use reqwest::header::ACCEPT;
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use moddash_proto::config::BackendConfig;
use moddash_proto::protocol::{
    ActivityPoint, Category, Filter, NewPost, Period, Post, PostsResponse, ServerStatusMap,
    WorkerTiming,
};

use crate::error::HttpError;

pub const POSTS_ENDPOINT: &str = "/api/posts";
pub const STATUS_ENDPOINT: &str = "/api/status";
pub const ACTIVITY_ENDPOINT: &str = "/api/activity";
pub const PROCESSING_TIMES_ENDPOINT: &str = "/api/processing-times";
pub const CATEGORIES_ENDPOINT: &str = "/api/categories";

/// Query parameter list; `None` values are left out of the query string.
pub type Params<'a> = [(&'a str, Option<&'a str>)];

pub struct Gateway {
    client: reqwest::Client,
    base_url: String,
}

impl Gateway {
    pub fn new(config: &BackendConfig) -> anyhow::Result<Self> {
        let timeout = config.request_timeout();
        let client = reqwest::Client::builder()
            .user_agent(concat!("moddash/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Url::parse(&config.base_url)
            .with_context(|| format!("Invalid backend base_url {:?}", config.base_url))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for `endpoint` under the configured base path.
    pub fn url(&self, endpoint: &str, params: &Params<'_>) -> Result<Url, HttpError> {
        let joined = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));
        let mut url = Url::parse(&joined)
            .map_err(|e| HttpError::network(format!("invalid url {}: {}", joined, e)))?;

        let present: Vec<(&str, &str)> = params
            .iter()
            .filter_map(|(k, v)| v.map(|v| (*k, v)))
            .collect();
        if !present.is_empty() {
            url.query_pairs_mut().extend_pairs(present);
        }
        Ok(url)
    }

    /// GET `endpoint` and decode the body into `T`.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &Params<'_>,
    ) -> Result<T, HttpError> {
        let url = self.url(endpoint, params)?;
        debug!("[gateway] GET {}", url);
        self.read_json(self.client.get(url)).await
    }

    pub async fn fetch_posts(
        &self,
        period: Option<Period>,
        filter: Option<Filter>,
    ) -> Result<PostsResponse, HttpError> {
        self.fetch(
            POSTS_ENDPOINT,
            &[
                ("period", period.map(|p| p.as_str())),
                ("filter", filter.map(|f| f.as_str())),
            ],
        )
        .await
    }

    pub async fn fetch_status(&self) -> Result<ServerStatusMap, HttpError> {
        self.fetch(STATUS_ENDPOINT, &[]).await
    }

    pub async fn fetch_activity(&self, period: Period) -> Result<Vec<ActivityPoint>, HttpError> {
        self.fetch(ACTIVITY_ENDPOINT, &[("period", Some(period.as_str()))])
            .await
    }

    pub async fn fetch_processing_times(
        &self,
        period: Period,
    ) -> Result<Vec<WorkerTiming>, HttpError> {
        self.fetch(PROCESSING_TIMES_ENDPOINT, &[("period", Some(period.as_str()))])
            .await
    }

    pub async fn fetch_categories(&self, period: Period) -> Result<Vec<Category>, HttpError> {
        self.fetch(CATEGORIES_ENDPOINT, &[("period", Some(period.as_str()))])
            .await
    }

    /// POST a new item for moderation.  Callers validate first.
    pub async fn create_post(&self, post: &NewPost) -> Result<Post, HttpError> {
        let url = self.url(POSTS_ENDPOINT, &[])?;
        debug!("[gateway] POST {} title={:?}", url, post.title);
        self.read_json(self.client.post(url).json(post)).await
    }

    async fn read_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, HttpError> {
        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::Status {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = response.bytes().await.map_err(transport_error)?;
        serde_json::from_slice(&body).map_err(|e| HttpError::decode(e.to_string()))
    }
}

fn transport_error(err: reqwest::Error) -> HttpError {
    if err.is_timeout() {
        HttpError::network("request timed out")
    } else if err.is_decode() {
        HttpError::decode(err.to_string())
    } else {
        HttpError::network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(base: &str) -> Gateway {
        Gateway::new(&BackendConfig {
            base_url: base.to_string(),
            request_timeout_secs: 12,
        })
        .unwrap()
    }

    #[test]
    fn test_url_omits_absent_params() {
        let gw = gateway("http://localhost:3001");
        let url = gw
            .url(POSTS_ENDPOINT, &[("period", Some("week")), ("filter", None)])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:3001/api/posts?period=week");

        let bare = gw.url(STATUS_ENDPOINT, &[("period", None)]).unwrap();
        assert_eq!(bare.as_str(), "http://localhost:3001/api/status");
    }

    #[test]
    fn test_url_keeps_deployment_base_path() {
        let gw = gateway("https://ops.example.com/moderation/");
        let url = gw
            .url(ACTIVITY_ENDPOINT, &[("period", Some("day"))])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://ops.example.com/moderation/api/activity?period=day"
        );
    }

    #[test]
    fn test_url_encodes_values() {
        let gw = gateway("http://localhost:3001");
        let url = gw
            .url(POSTS_ENDPOINT, &[("filter", Some("needs review&x=1"))])
            .unwrap();
        assert_eq!(url.query(), Some("filter=needs+review%26x%3D1"));
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let res = Gateway::new(&BackendConfig {
            base_url: "not a url".into(),
            request_timeout_secs: 12,
        });
        assert!(res.is_err());
    }
}
