//! Identities, requests and the event type that drives every controller.

use moddash_proto::protocol::{
    ActivityPoint, Category, Filter, Period, Post, PostsResponse, ServerStatusMap, WorkerTiming,
};

use crate::error::HttpError;
use crate::gateway::Gateway;

/// Monotonic per-controller request generation.
pub type Generation = u64;

/// Identity of one logical feed.  Also used as the notification source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKey {
    Stats,
    ServerStatus,
    RecentItems,
    ProcessingTimes,
    Activity,
    AnalyticsActivity,
    WorkerPerformance,
    Categories,
    Insights,
    ContentList,
}

impl FeedKey {
    pub fn label(&self) -> &'static str {
        match self {
            FeedKey::Stats => "stats",
            FeedKey::ServerStatus => "server-status",
            FeedKey::RecentItems => "recent-items",
            FeedKey::ProcessingTimes => "processing-times",
            FeedKey::Activity => "activity",
            FeedKey::AnalyticsActivity => "analytics-activity",
            FeedKey::WorkerPerformance => "worker-performance",
            FeedKey::Categories => "categories",
            FeedKey::Insights => "insights",
            FeedKey::ContentList => "content-list",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            FeedKey::Stats => "Statistics",
            FeedKey::ServerStatus => "Server Status",
            FeedKey::RecentItems => "Recent Content",
            FeedKey::ProcessingTimes => "Processing Time",
            FeedKey::Activity | FeedKey::AnalyticsActivity => "Content Activity",
            FeedKey::WorkerPerformance => "Moderator Performance",
            FeedKey::Categories => "Content Categories",
            FeedKey::Insights => "Insights",
            FeedKey::ContentList => "Content",
        }
    }

    /// The request a period-scoped feed issues for `period`.
    /// `None` for feeds that are not keyed by period.
    pub fn period_request(&self, period: Period) -> Option<Request> {
        match self {
            FeedKey::Stats | FeedKey::RecentItems | FeedKey::Insights => Some(Request::Posts {
                period: Some(period),
                filter: None,
            }),
            FeedKey::ServerStatus => Some(Request::ServerStatus),
            FeedKey::ProcessingTimes | FeedKey::WorkerPerformance => {
                Some(Request::ProcessingTimes { period })
            }
            FeedKey::Activity | FeedKey::AnalyticsActivity => Some(Request::Activity { period }),
            FeedKey::Categories => Some(Request::Categories { period }),
            FeedKey::ContentList => None,
        }
    }
}

/// One backend call, fully parameterized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Posts {
        period: Option<Period>,
        filter: Option<Filter>,
    },
    ServerStatus,
    Activity {
        period: Period,
    },
    ProcessingTimes {
        period: Period,
    },
    Categories {
        period: Period,
    },
}

impl Request {
    pub async fn execute(&self, gateway: &Gateway) -> Result<Payload, HttpError> {
        match self {
            Request::Posts { period, filter } => gateway
                .fetch_posts(*period, *filter)
                .await
                .map(Payload::Posts),
            Request::ServerStatus => gateway.fetch_status().await.map(Payload::ServerStatus),
            Request::Activity { period } => {
                gateway.fetch_activity(*period).await.map(Payload::Activity)
            }
            Request::ProcessingTimes { period } => gateway
                .fetch_processing_times(*period)
                .await
                .map(Payload::ProcessingTimes),
            Request::Categories { period } => gateway
                .fetch_categories(*period)
                .await
                .map(Payload::Categories),
        }
    }
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Posts(PostsResponse),
    ServerStatus(ServerStatusMap),
    Activity(Vec<ActivityPoint>),
    ProcessingTimes(Vec<WorkerTiming>),
    Categories(Vec<Category>),
}

impl Payload {
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Posts(_) => "posts",
            Payload::ServerStatus(_) => "status",
            Payload::Activity(_) => "activity",
            Payload::ProcessingTimes(_) => "processing-times",
            Payload::Categories(_) => "categories",
        }
    }
}

/// A request a controller has decided to issue, stamped with its generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub key: FeedKey,
    pub generation: Generation,
    pub request: Request,
}

/// Everything that can wake a controller.
#[derive(Debug)]
pub enum SyncEvent {
    /// A feed's polling timer fired.
    Tick(FeedKey),
    /// A request finished, successfully or not.
    Fetched {
        key: FeedKey,
        generation: Generation,
        outcome: Result<Payload, HttpError>,
    },
    /// The content submission request finished.
    Submitted(Result<Post, HttpError>),
}
