//! Wire types for the moderation backend's HTTP JSON API.
//!
//! The backend is loose about shapes: counters may be absent or `null`,
//! item ids arrive as strings or numbers, and server status is either a
//! label or a legacy boolean.  Every one of those variants is folded into a
//! single canonical type here, at deserialization time, so nothing
//! downstream branches on raw wire shape.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ── Parameters ────────────────────────────────────────────────────────────────

/// Reporting window shared by every dashboard feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    #[default]
    Week,
    Month,
    Year,
}

impl Period {
    pub const ALL: [Period; 4] = [Period::Day, Period::Week, Period::Month, Period::Year];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Period::Day => "Today",
            Period::Week => "This Week",
            Period::Month => "This Month",
            Period::Year => "This Year",
        }
    }

    /// Length of the window ending "now".
    pub fn window(&self) -> chrono::Duration {
        match self {
            Period::Day => chrono::Duration::days(1),
            Period::Week => chrono::Duration::days(7),
            Period::Month => chrono::Duration::days(30),
            Period::Year => chrono::Duration::days(365),
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server-side status filter for the content list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    #[default]
    All,
    Approved,
    Rejected,
    Pending,
    NeedsReview,
}

impl Filter {
    pub const ALL: [Filter; 5] = [
        Filter::All,
        Filter::Approved,
        Filter::Rejected,
        Filter::Pending,
        Filter::NeedsReview,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Approved => "approved",
            Filter::Rejected => "rejected",
            Filter::Pending => "pending",
            Filter::NeedsReview => "needs_review",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Approved => "Approved",
            Filter::Rejected => "Rejected",
            Filter::Pending => "Pending",
            Filter::NeedsReview => "Needs review",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == s)
    }

    /// The filter after this one, wrapping around.
    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn matches(&self, status: &PostStatus) -> bool {
        match self {
            Filter::All => true,
            Filter::Approved => *status == PostStatus::Approved,
            Filter::Rejected => *status == PostStatus::Rejected,
            Filter::Pending => *status == PostStatus::Pending,
            Filter::NeedsReview => *status == PostStatus::NeedsReview,
        }
    }

    /// Number of stats counted under this filter (for filter button badges).
    pub fn count_in(&self, stats: &Stats) -> u64 {
        match self {
            Filter::All => stats.total,
            Filter::Approved => stats.approved,
            Filter::Rejected => stats.rejected,
            Filter::Pending => stats.pending,
            Filter::NeedsReview => stats.needs_review,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Moderated items ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Approved,
    Rejected,
    #[default]
    Pending,
    Processing,
    NeedsReview,
    #[serde(other)]
    Unknown,
}

impl PostStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PostStatus::Approved => "Approved",
            PostStatus::Rejected => "Rejected",
            PostStatus::Pending => "Pending",
            PostStatus::Processing => "Processing",
            PostStatus::NeedsReview => "Needs review",
            PostStatus::Unknown => "Unknown",
        }
    }

    /// True once a worker has reached a verdict.
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            PostStatus::Approved | PostStatus::Rejected | PostStatus::NeedsReview
        )
    }
}

/// A moderated item.  Read-only from the dashboard's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: PostStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub server: String,
    #[serde(default)]
    pub worker: Option<String>,
    #[serde(default)]
    pub moderation_details: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toxicity_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Time the worker spent on this item, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
}

/// Aggregate counters.  The backend's `total` is authoritative; it is never
/// recomputed from the other counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub approved: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rejected: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pending: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub processing: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub needs_review: u64,
}

/// Body of `GET /api/posts`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PostsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub posts: Vec<Post>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stats: Stats,
}

/// Body of `POST /api/posts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author: String,
    pub category: String,
    pub server: String,
}

// ── Server status ─────────────────────────────────────────────────────────────

/// Accepted wire encodings of one server's status.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireServerState {
    Flag(bool),
    Label(String),
    Missing,
}

/// Canonical server status.  Deserializes from any [`WireServerState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireServerState", into = "String")]
pub enum ServerState {
    Online,
    Offline,
    Busy,
    Idle,
    Unknown(String),
}

impl ServerState {
    pub fn as_str(&self) -> &str {
        match self {
            ServerState::Online => "online",
            ServerState::Offline => "offline",
            ServerState::Busy => "busy",
            ServerState::Idle => "idle",
            ServerState::Unknown(s) => s.as_str(),
        }
    }

    /// Busy and idle servers are reachable, so they count as online.
    pub fn is_online(&self) -> bool {
        matches!(
            self,
            ServerState::Online | ServerState::Busy | ServerState::Idle
        )
    }
}

impl From<WireServerState> for ServerState {
    fn from(raw: WireServerState) -> Self {
        match raw {
            WireServerState::Flag(true) => ServerState::Online,
            WireServerState::Flag(false) => ServerState::Offline,
            WireServerState::Label(label) => match label.to_ascii_lowercase().as_str() {
                "online" => ServerState::Online,
                "offline" => ServerState::Offline,
                "busy" => ServerState::Busy,
                "idle" => ServerState::Idle,
                _ => ServerState::Unknown(label),
            },
            WireServerState::Missing => ServerState::Unknown("unknown".to_string()),
        }
    }
}

impl From<ServerState> for String {
    fn from(state: ServerState) -> Self {
        state.as_str().to_string()
    }
}

/// Body of `GET /api/status`: server name → status, ordered by name.
pub type ServerStatusMap = BTreeMap<String, ServerState>;

// ── Analytics series ──────────────────────────────────────────────────────────

/// One bucket of `GET /api/activity`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActivityPoint {
    #[serde(default, deserialize_with = "null_as_default")]
    pub day: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub approved: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rejected: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pending: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub needs_review: u64,
}

/// One worker row of `GET /api/processing-times`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkerTiming {
    #[serde(default, deserialize_with = "null_as_default")]
    pub worker: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub processed: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub approved: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rejected: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub needs_review: u64,
    /// Mean seconds per item.
    #[serde(
        rename = "averageTime",
        alias = "average_time",
        default,
        deserialize_with = "null_as_default"
    )]
    pub average_time: f64,
}

/// One slice of `GET /api/categories`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Category {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: u64,
}

// ── Deserialization helpers ───────────────────────────────────────────────────

/// Treat an explicit `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
        RawId::Float(f) => f.to_string(),
    })
}
