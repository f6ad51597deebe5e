//! Data-synchronization core of the moderation dashboard.
//!
//! Decides when to fetch what, under which parameters, and which responses
//! are still allowed to land.  Views read the resulting [`FeedState`]s but
//! never write them; every mutation happens inside a controller callback
//! driven by a [`SyncEvent`].
//!
//! [`FeedState`]: feed::FeedState
//! [`SyncEvent`]: event::SyncEvent

pub mod analytics;
pub mod content_list;
pub mod dashboard;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod feed;
pub mod gateway;
pub mod hub;
pub mod notify;
pub mod scheduler;
pub mod session;
pub mod submission;

mod period_group;

pub use error::{HttpError, SubmitError, ValidationError};
pub use event::{FeedKey, FetchTicket, Generation, Payload, Request, SyncEvent};
pub use feed::{Applied, FeedController, FeedHandle, FeedState, FeedStatus};
pub use gateway::Gateway;
pub use hub::{SyncHub, View};
pub use notify::{NotificationBridge, NotificationEvent, NotificationId, NotificationKind};
pub use scheduler::{IntervalScheduler, ManualScheduler, Scheduler};
