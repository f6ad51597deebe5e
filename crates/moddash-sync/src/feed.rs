//! Feed controller: one logical data feed with its own timer and
//! request generation.
//!
//! # States
//! ```text
//!  Idle ──mount──▶ Loading ──ok──▶ Ready
//!                     │  ▲           │
//!                   fail └─trigger───┤
//!                     ▼              │
//!                   Error ◀──fail────┘
//! ```
//!
//! Every trigger takes a fresh generation and only the response carrying
//! the current generation may land; anything older is dropped unread.
//! There is no network abort: a superseded request finishes on the wire
//! and is ignored.

use std::time::Duration;

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::error::HttpError;
use crate::event::{FeedKey, FetchTicket, Generation, Payload, Request};
use crate::notify::{NotificationBridge, NotificationEvent};
use crate::scheduler::Scheduler;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

/// What a view may read about a feed.
#[derive(Debug, Clone)]
pub struct FeedState<T> {
    /// Last known good data.  Only replaced by a current-generation success.
    pub data: Option<T>,
    pub status: FeedStatus,
    pub error_message: Option<String>,
    /// Generation of the most recently issued request.
    pub request_token: Generation,
    pub updated_at: Option<DateTime<Local>>,
}

impl<T> Default for FeedState<T> {
    fn default() -> Self {
        Self {
            data: None,
            status: FeedStatus::Idle,
            error_message: None,
            request_token: 0,
            updated_at: None,
        }
    }
}

impl<T> FeedState<T> {
    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.status == FeedStatus::Loading
    }

    /// Loading with nothing to show yet.
    pub fn is_first_load(&self) -> bool {
        self.is_loading() && self.data.is_none()
    }
}

/// Result of handing a response to a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// New data published.
    Fresh,
    /// Current request failed; previous data kept.
    Failed,
    /// Superseded or post-teardown response; discarded.
    Stale,
}

/// Turns a decoded payload into the feed's data type.
pub type Extract<T> = Box<dyn Fn(Payload) -> Result<T, HttpError> + Send>;

pub struct FeedController<T> {
    key: FeedKey,
    state: FeedState<T>,
    generation: Generation,
    /// Generation still awaiting its response, if any.
    in_flight: Option<Generation>,
    interval: Duration,
    scheduler: Box<dyn Scheduler>,
    extract: Extract<T>,
    mounted: bool,
    /// True from the first failure until the next success.
    outage: bool,
}

impl<T> FeedController<T> {
    pub fn new(
        key: FeedKey,
        interval: Duration,
        scheduler: Box<dyn Scheduler>,
        extract: Extract<T>,
    ) -> Self {
        Self {
            key,
            state: FeedState::default(),
            generation: 0,
            in_flight: None,
            interval,
            scheduler,
            extract,
            mounted: false,
            outage: false,
        }
    }

    pub fn key(&self) -> FeedKey {
        self.key
    }

    pub fn state(&self) -> &FeedState<T> {
        &self.state
    }

    pub fn data(&self) -> Option<&T> {
        self.state.data.as_ref()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start the timer and issue the first request.
    pub fn mount(&mut self, request: Request) -> FetchTicket {
        if !self.mounted {
            self.mounted = true;
            self.scheduler.start(self.interval);
            info!("[feed:{}] mounted, polling every {:?}", self.key.label(), self.interval);
        }
        self.issue(request)
    }

    /// Re-trigger (parameter change, timer tick, user refresh).
    /// Returns `None` when the feed is not mounted.
    pub fn trigger(&mut self, request: Request) -> Option<FetchTicket> {
        if !self.mounted {
            debug!("[feed:{}] trigger ignored, not mounted", self.key.label());
            return None;
        }
        Some(self.issue(request))
    }

    fn issue(&mut self, request: Request) -> FetchTicket {
        self.generation += 1;
        if let Some(previous) = self.in_flight.replace(self.generation) {
            debug!(
                "[feed:{}] gen {} supersedes in-flight gen {}",
                self.key.label(),
                self.generation,
                previous
            );
        }
        self.state.status = FeedStatus::Loading;
        self.state.request_token = self.generation;
        FetchTicket {
            key: self.key,
            generation: self.generation,
            request,
        }
    }

    /// Apply a finished request.  Only the current in-flight generation lands.
    pub fn apply(
        &mut self,
        generation: Generation,
        outcome: Result<Payload, HttpError>,
        notifications: &mut NotificationBridge,
    ) -> Applied {
        if self.in_flight != Some(generation) {
            debug!(
                "[feed:{}] dropping stale gen {} (current {})",
                self.key.label(),
                generation,
                self.generation
            );
            return Applied::Stale;
        }
        self.in_flight = None;

        match outcome.and_then(|payload| (self.extract)(payload)) {
            Ok(data) => {
                self.state.data = Some(data);
                self.state.status = FeedStatus::Ready;
                self.state.error_message = None;
                self.state.updated_at = Some(Local::now());
                if self.outage {
                    self.outage = false;
                    info!("[feed:{}] recovered at gen {}", self.key.label(), generation);
                } else {
                    debug!("[feed:{}] applied gen {}", self.key.label(), generation);
                }
                Applied::Fresh
            }
            Err(err) => {
                warn!("[feed:{}] gen {} failed: {}", self.key.label(), generation, err);
                let summary = err.summary();
                self.state.status = FeedStatus::Error;
                self.state.error_message = Some(summary.clone());
                if !self.outage {
                    self.outage = true;
                    notifications.enqueue(
                        NotificationEvent::error(format!("{} unavailable", self.key.title()))
                            .with_message(summary)
                            .from_source(self.key.label()),
                    );
                }
                Applied::Failed
            }
        }
    }

    /// Stop the timer and make any in-flight response inert.
    pub fn teardown(&mut self) {
        if !self.mounted {
            return;
        }
        self.scheduler.stop();
        self.generation += 1;
        self.in_flight = None;
        self.mounted = false;
        if self.state.status == FeedStatus::Loading {
            self.state.status = if self.state.data.is_some() {
                FeedStatus::Ready
            } else {
                FeedStatus::Idle
            };
        }
        info!("[feed:{}] torn down", self.key.label());
    }
}

impl<T> Drop for FeedController<T> {
    fn drop(&mut self) {
        self.scheduler.stop();
    }
}

/// Type-erased view of a controller, for aggregators that drive feeds
/// of different data types uniformly.
pub trait FeedHandle {
    fn key(&self) -> FeedKey;
    fn status(&self) -> FeedStatus;
    fn has_data(&self) -> bool;
    fn is_mounted(&self) -> bool;
    fn mount(&mut self, request: Request) -> FetchTicket;
    fn trigger(&mut self, request: Request) -> Option<FetchTicket>;
    fn apply(
        &mut self,
        generation: Generation,
        outcome: Result<Payload, HttpError>,
        notifications: &mut NotificationBridge,
    ) -> Applied;
    fn teardown(&mut self);
}

impl<T> FeedHandle for FeedController<T> {
    fn key(&self) -> FeedKey {
        self.key
    }

    fn status(&self) -> FeedStatus {
        self.state.status
    }

    fn has_data(&self) -> bool {
        self.state.has_data()
    }

    fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn mount(&mut self, request: Request) -> FetchTicket {
        FeedController::mount(self, request)
    }

    fn trigger(&mut self, request: Request) -> Option<FetchTicket> {
        FeedController::trigger(self, request)
    }

    fn apply(
        &mut self,
        generation: Generation,
        outcome: Result<Payload, HttpError>,
        notifications: &mut NotificationBridge,
    ) -> Applied {
        FeedController::apply(self, generation, outcome, notifications)
    }

    fn teardown(&mut self) {
        FeedController::teardown(self)
    }
}

/// `Extract` for feeds that want one payload variant as-is.
pub fn wrong_payload(key: FeedKey, payload: &Payload) -> HttpError {
    HttpError::decode(format!(
        "{} feed received a {} payload",
        key.label(),
        payload.kind()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;
    use moddash_proto::protocol::{Period, PostsResponse, Stats};

    fn stats_feed(timer: &ManualScheduler) -> FeedController<Stats> {
        FeedController::new(
            FeedKey::Stats,
            Duration::from_secs(10),
            Box::new(timer.clone()),
            Box::new(|payload| match payload {
                Payload::Posts(resp) => Ok(resp.stats),
                other => Err(wrong_payload(FeedKey::Stats, &other)),
            }),
        )
    }

    fn posts(total: u64) -> Result<Payload, HttpError> {
        Ok(Payload::Posts(PostsResponse {
            posts: Vec::new(),
            stats: Stats {
                total,
                ..Stats::default()
            },
        }))
    }

    fn request(period: Period) -> Request {
        Request::Posts {
            period: Some(period),
            filter: None,
        }
    }

    #[test]
    fn test_mount_starts_timer_and_loads() {
        let timer = ManualScheduler::new();
        let mut feed = stats_feed(&timer);
        assert_eq!(feed.state().status, FeedStatus::Idle);
        assert!(feed.trigger(request(Period::Week)).is_none());

        let ticket = feed.mount(request(Period::Week));
        assert_eq!(ticket.generation, 1);
        assert_eq!(feed.state().status, FeedStatus::Loading);
        assert_eq!(feed.state().request_token, 1);
        assert_eq!(timer.interval(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_only_latest_generation_lands() {
        let timer = ManualScheduler::new();
        let mut notes = NotificationBridge::default();
        let mut feed = stats_feed(&timer);

        let day = feed.mount(request(Period::Day));
        let week = feed.trigger(request(Period::Week)).unwrap();
        let month = feed.trigger(request(Period::Month)).unwrap();
        assert!(day.generation < week.generation && week.generation < month.generation);

        // Arrival order: month, day, week.
        assert_eq!(feed.apply(month.generation, posts(30), &mut notes), Applied::Fresh);
        assert_eq!(feed.apply(day.generation, posts(1), &mut notes), Applied::Stale);
        assert_eq!(feed.apply(week.generation, posts(7), &mut notes), Applied::Stale);
        assert_eq!(feed.data().map(|s| s.total), Some(30));
        assert_eq!(feed.state().status, FeedStatus::Ready);
    }

    #[test]
    fn test_duplicate_delivery_is_stale() {
        let timer = ManualScheduler::new();
        let mut notes = NotificationBridge::default();
        let mut feed = stats_feed(&timer);
        let t = feed.mount(request(Period::Week));
        assert_eq!(feed.apply(t.generation, posts(5), &mut notes), Applied::Fresh);
        assert_eq!(feed.apply(t.generation, posts(6), &mut notes), Applied::Stale);
        assert_eq!(feed.data().map(|s| s.total), Some(5));
    }

    #[test]
    fn test_failure_keeps_last_good_data() {
        let timer = ManualScheduler::new();
        let mut notes = NotificationBridge::default();
        let mut feed = stats_feed(&timer);

        let t1 = feed.mount(request(Period::Week));
        feed.apply(t1.generation, posts(42), &mut notes);

        let t2 = feed.trigger(request(Period::Week)).unwrap();
        let outcome = feed.apply(t2.generation, Err(HttpError::network("refused")), &mut notes);
        assert_eq!(outcome, Applied::Failed);
        assert_eq!(feed.state().status, FeedStatus::Error);
        assert_eq!(feed.data().map(|s| s.total), Some(42));
        assert!(feed
            .state()
            .error_message
            .as_deref()
            .is_some_and(|m| m.contains("unreachable")));

        let t3 = feed.trigger(request(Period::Week)).unwrap();
        feed.apply(t3.generation, posts(43), &mut notes);
        assert_eq!(feed.state().error_message, None);
        assert_eq!(feed.data().map(|s| s.total), Some(43));
    }

    #[test]
    fn test_one_notification_per_outage() {
        let timer = ManualScheduler::new();
        let mut notes = NotificationBridge::default();
        let mut feed = stats_feed(&timer);

        let t = feed.mount(request(Period::Week));
        feed.apply(t.generation, Err(HttpError::network("refused")), &mut notes);
        assert_eq!(notes.count_from("stats"), 1);
        notes.dismiss_all();

        for _ in 0..5 {
            let t = feed.trigger(request(Period::Week)).unwrap();
            feed.apply(t.generation, Err(HttpError::network("refused")), &mut notes);
        }
        assert_eq!(notes.count_from("stats"), 0);

        // recover, then fail again: a new outage notifies again
        let t = feed.trigger(request(Period::Week)).unwrap();
        feed.apply(t.generation, posts(1), &mut notes);
        let t = feed.trigger(request(Period::Week)).unwrap();
        feed.apply(t.generation, Err(HttpError::decode("eof")), &mut notes);
        assert_eq!(notes.len(), 0, "still inside the bridge de-dup window");
    }

    #[test]
    fn test_wrong_payload_is_a_decode_failure() {
        let timer = ManualScheduler::new();
        let mut notes = NotificationBridge::default();
        let mut feed = stats_feed(&timer);
        let t = feed.mount(request(Period::Week));
        let outcome = feed.apply(t.generation, Ok(Payload::Categories(vec![])), &mut notes);
        assert_eq!(outcome, Applied::Failed);
        assert!(feed.data().is_none());
    }

    #[test]
    fn test_teardown_discards_in_flight() {
        let timer = ManualScheduler::new();
        let mut notes = NotificationBridge::default();
        let mut feed = stats_feed(&timer);
        let t = feed.mount(request(Period::Week));
        feed.teardown();
        assert!(!timer.is_running());
        assert_eq!(timer.stops(), 1);
        assert_eq!(feed.apply(t.generation, posts(9), &mut notes), Applied::Stale);
        assert!(feed.data().is_none());
        assert_eq!(feed.state().status, FeedStatus::Idle);
        assert!(feed.trigger(request(Period::Week)).is_none());
    }
}
