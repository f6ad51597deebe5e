//! Dashboard view-model: five feeds sharing one period.
//!
//! A period change re-triggers every child before returning, so no panel
//! keeps polling the old period while another has moved on.  Afterwards
//! each panel degrades on its own: one failing feed never blanks the rest.

use std::time::Duration;

use tracing::info;

use moddash_proto::protocol::{ActivityPoint, Period, Post, ServerStatusMap, Stats, WorkerTiming};

use crate::content_list::sort_newest_first;
use crate::error::HttpError;
use crate::event::{FeedKey, FetchTicket, Generation, Payload};
use crate::feed::{wrong_payload, Applied, FeedController, FeedHandle, FeedState, FeedStatus};
use crate::notify::NotificationBridge;
use crate::period_group;
use crate::scheduler::SchedulerFactory;

pub struct Dashboard {
    period: Period,
    stats: FeedController<Stats>,
    servers: FeedController<ServerStatusMap>,
    recent: FeedController<Vec<Post>>,
    processing: FeedController<Vec<WorkerTiming>>,
    activity: FeedController<Vec<ActivityPoint>>,
}

impl Dashboard {
    pub const FEEDS: [FeedKey; 5] = [
        FeedKey::Stats,
        FeedKey::ServerStatus,
        FeedKey::RecentItems,
        FeedKey::ProcessingTimes,
        FeedKey::Activity,
    ];

    pub fn new(
        period: Period,
        interval: Duration,
        recent_limit: usize,
        schedulers: &mut SchedulerFactory<'_>,
    ) -> Self {
        Self {
            period,
            stats: FeedController::new(
                FeedKey::Stats,
                interval,
                schedulers(FeedKey::Stats),
                Box::new(|payload| match payload {
                    Payload::Posts(resp) => Ok(resp.stats),
                    other => Err(wrong_payload(FeedKey::Stats, &other)),
                }),
            ),
            servers: FeedController::new(
                FeedKey::ServerStatus,
                interval,
                schedulers(FeedKey::ServerStatus),
                Box::new(|payload| match payload {
                    Payload::ServerStatus(map) => Ok(map),
                    other => Err(wrong_payload(FeedKey::ServerStatus, &other)),
                }),
            ),
            recent: FeedController::new(
                FeedKey::RecentItems,
                interval,
                schedulers(FeedKey::RecentItems),
                Box::new(move |payload| match payload {
                    Payload::Posts(resp) => {
                        let mut posts = resp.posts;
                        sort_newest_first(&mut posts);
                        posts.truncate(recent_limit);
                        Ok(posts)
                    }
                    other => Err(wrong_payload(FeedKey::RecentItems, &other)),
                }),
            ),
            processing: FeedController::new(
                FeedKey::ProcessingTimes,
                interval,
                schedulers(FeedKey::ProcessingTimes),
                Box::new(|payload| match payload {
                    Payload::ProcessingTimes(rows) => Ok(rows),
                    other => Err(wrong_payload(FeedKey::ProcessingTimes, &other)),
                }),
            ),
            activity: FeedController::new(
                FeedKey::Activity,
                interval,
                schedulers(FeedKey::Activity),
                Box::new(|payload| match payload {
                    Payload::Activity(points) => Ok(points),
                    other => Err(wrong_payload(FeedKey::Activity, &other)),
                }),
            ),
        }
    }

    fn handles_mut(&mut self) -> [&mut dyn FeedHandle; 5] {
        [
            &mut self.stats,
            &mut self.servers,
            &mut self.recent,
            &mut self.processing,
            &mut self.activity,
        ]
    }

    fn handles(&self) -> [&dyn FeedHandle; 5] {
        [
            &self.stats,
            &self.servers,
            &self.recent,
            &self.processing,
            &self.activity,
        ]
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn owns(&self, key: FeedKey) -> bool {
        Self::FEEDS.contains(&key)
    }

    pub fn is_mounted(&self) -> bool {
        self.handles().iter().any(|f| f.is_mounted())
    }

    pub fn mount(&mut self) -> Vec<FetchTicket> {
        info!("[dashboard] mount, period={}", self.period);
        let period = self.period;
        period_group::mount_all(&mut self.handles_mut(), period)
    }

    /// Switch every child to `period`.  Setting the current period is a no-op.
    pub fn set_period(&mut self, period: Period) -> Vec<FetchTicket> {
        if period == self.period {
            return Vec::new();
        }
        info!("[dashboard] period {} -> {}", self.period, period);
        self.period = period;
        period_group::trigger_all(&mut self.handles_mut(), period)
    }

    /// Re-fetch every child with the current period.
    pub fn refresh_all(&mut self) -> Vec<FetchTicket> {
        let period = self.period;
        period_group::trigger_all(&mut self.handles_mut(), period)
    }

    pub fn on_tick(&mut self, key: FeedKey) -> Option<FetchTicket> {
        let period = self.period;
        period_group::route_tick(&mut self.handles_mut(), key, period)
    }

    pub fn on_fetched(
        &mut self,
        key: FeedKey,
        generation: Generation,
        outcome: Result<Payload, HttpError>,
        notifications: &mut NotificationBridge,
    ) -> Option<Applied> {
        period_group::route_fetched(
            &mut self.handles_mut(),
            key,
            generation,
            outcome,
            notifications,
        )
    }

    pub fn unified_status(&self) -> FeedStatus {
        period_group::unified_status(&self.handles())
    }

    pub fn teardown(&mut self) {
        info!("[dashboard] teardown");
        period_group::teardown_all(&mut self.handles_mut());
    }

    pub fn stats(&self) -> &FeedState<Stats> {
        self.stats.state()
    }

    pub fn servers(&self) -> &FeedState<ServerStatusMap> {
        self.servers.state()
    }

    pub fn recent(&self) -> &FeedState<Vec<Post>> {
        self.recent.state()
    }

    pub fn processing(&self) -> &FeedState<Vec<WorkerTiming>> {
        self.processing.state()
    }

    pub fn activity(&self) -> &FeedState<Vec<ActivityPoint>> {
        self.activity.state()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{TimeZone, Utc};
    use moddash_proto::protocol::{PostStatus, PostsResponse, ServerState};

    use super::*;
    use crate::event::Request;
    use crate::scheduler::{ManualScheduler, Scheduler};

    fn dashboard(timers: &mut HashMap<FeedKey, ManualScheduler>) -> Dashboard {
        let mut factory = |key: FeedKey| {
            let timer = ManualScheduler::new();
            timers.insert(key, timer.clone());
            Box::new(timer) as Box<dyn Scheduler>
        };
        Dashboard::new(Period::Week, Duration::from_secs(10), 2, &mut factory)
    }

    fn post(id: &str, minute: u32) -> Post {
        Post {
            id: id.to_string(),
            title: format!("post {}", id),
            content: String::new(),
            author: "ana".into(),
            status: PostStatus::Approved,
            server: "server1".into(),
            worker: None,
            moderation_details: None,
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, minute, 0).unwrap(),
            completed_at: None,
            toxicity_score: None,
            review_reason: None,
            category: None,
            processing_time: None,
        }
    }

    fn ticket_for(tickets: &[FetchTicket], key: FeedKey) -> &FetchTicket {
        tickets.iter().find(|t| t.key == key).unwrap()
    }

    #[test]
    fn test_mount_starts_every_feed_on_shared_period() {
        let mut timers = HashMap::new();
        let mut dash = dashboard(&mut timers);
        let tickets = dash.mount();
        assert_eq!(tickets.len(), 5);
        assert!(timers.values().all(|t| t.is_running()));
        assert_eq!(
            ticket_for(&tickets, FeedKey::Activity).request,
            Request::Activity {
                period: Period::Week
            }
        );
        assert_eq!(dash.unified_status(), FeedStatus::Loading);
    }

    #[test]
    fn test_period_change_retriggers_all_children() {
        let mut timers = HashMap::new();
        let mut notes = NotificationBridge::default();
        let mut dash = dashboard(&mut timers);
        let first = dash.mount();

        let second = dash.set_period(Period::Month);
        assert_eq!(second.len(), 5);
        for t in &second {
            if let Some(expected) = t.key.period_request(Period::Month) {
                assert_eq!(t.request, expected);
            }
        }

        // The week response for stats lands late and is discarded.
        let old = ticket_for(&first, FeedKey::Stats);
        let outcome = Ok(Payload::Posts(PostsResponse::default()));
        assert_eq!(
            dash.on_fetched(FeedKey::Stats, old.generation, outcome, &mut notes),
            Some(Applied::Stale)
        );
        assert!(dash.stats().data.is_none());
        assert!(dash.set_period(Period::Month).is_empty());
    }

    #[test]
    fn test_one_failing_feed_does_not_blank_others() {
        let mut timers = HashMap::new();
        let mut notes = NotificationBridge::default();
        let mut dash = dashboard(&mut timers);
        let tickets = dash.mount();

        let servers = ticket_for(&tickets, FeedKey::ServerStatus);
        let mut map = ServerStatusMap::new();
        map.insert("server1".into(), ServerState::Busy);
        dash.on_fetched(
            FeedKey::ServerStatus,
            servers.generation,
            Ok(Payload::ServerStatus(map)),
            &mut notes,
        );

        let stats = ticket_for(&tickets, FeedKey::Stats);
        dash.on_fetched(
            FeedKey::Stats,
            stats.generation,
            Err(HttpError::network("refused")),
            &mut notes,
        );

        assert_eq!(dash.stats().status, FeedStatus::Error);
        assert_eq!(dash.servers().status, FeedStatus::Ready);
        assert_eq!(dash.unified_status(), FeedStatus::Ready);
        assert_eq!(notes.count_from("stats"), 1);
    }

    #[test]
    fn test_recent_items_sorted_and_limited() {
        let mut timers = HashMap::new();
        let mut notes = NotificationBridge::default();
        let mut dash = dashboard(&mut timers);
        let tickets = dash.mount();
        let recent = ticket_for(&tickets, FeedKey::RecentItems);
        let resp = PostsResponse {
            posts: vec![post("a", 1), post("b", 9), post("c", 5)],
            stats: Stats::default(),
        };
        dash.on_fetched(
            FeedKey::RecentItems,
            recent.generation,
            Ok(Payload::Posts(resp)),
            &mut notes,
        );
        let ids: Vec<&str> = dash
            .recent()
            .data
            .as_ref()
            .unwrap()
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn test_tick_refetches_only_that_feed() {
        let mut timers = HashMap::new();
        let mut dash = dashboard(&mut timers);
        dash.mount();
        let ticket = dash.on_tick(FeedKey::ProcessingTimes).unwrap();
        assert_eq!(ticket.key, FeedKey::ProcessingTimes);
        assert_eq!(ticket.generation, 2);
        assert!(dash.on_tick(FeedKey::Categories).is_none());
    }

    #[test]
    fn test_all_failures_before_data_is_error() {
        let mut timers = HashMap::new();
        let mut notes = NotificationBridge::default();
        let mut dash = dashboard(&mut timers);
        for t in dash.mount() {
            dash.on_fetched(t.key, t.generation, Err(HttpError::decode("x")), &mut notes);
        }
        assert_eq!(dash.unified_status(), FeedStatus::Error);
    }

    #[test]
    fn test_teardown_stops_timers_and_discards() {
        let mut timers = HashMap::new();
        let mut notes = NotificationBridge::default();
        let mut dash = dashboard(&mut timers);
        let tickets = dash.mount();
        dash.teardown();
        assert!(timers.values().all(|t| !t.is_running()));
        assert!(!dash.is_mounted());
        let stats = ticket_for(&tickets, FeedKey::Stats);
        assert_eq!(
            dash.on_fetched(
                FeedKey::Stats,
                stats.generation,
                Ok(Payload::Posts(PostsResponse::default())),
                &mut notes
            ),
            Some(Applied::Stale)
        );
        assert!(dash.on_tick(FeedKey::Stats).is_none());
    }
}
