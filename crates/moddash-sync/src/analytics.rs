//! Analytics view-model: categories, moderator performance, insights and
//! activity, all following one period of their own.

use std::time::Duration;

use tracing::info;

use moddash_proto::metrics::{category_shares, CategoryShare, Insights};
use moddash_proto::protocol::{ActivityPoint, Category, Period, WorkerTiming};

use crate::error::HttpError;
use crate::event::{FeedKey, FetchTicket, Generation, Payload};
use crate::feed::{wrong_payload, Applied, FeedController, FeedHandle, FeedState, FeedStatus};
use crate::notify::NotificationBridge;
use crate::period_group;
use crate::scheduler::SchedulerFactory;

pub struct Analytics {
    period: Period,
    categories: FeedController<Vec<Category>>,
    workers: FeedController<Vec<WorkerTiming>>,
    insights: FeedController<Insights>,
    activity: FeedController<Vec<ActivityPoint>>,
}

impl Analytics {
    pub const FEEDS: [FeedKey; 4] = [
        FeedKey::Categories,
        FeedKey::WorkerPerformance,
        FeedKey::Insights,
        FeedKey::AnalyticsActivity,
    ];

    pub fn new(period: Period, interval: Duration, schedulers: &mut SchedulerFactory<'_>) -> Self {
        Self {
            period,
            categories: FeedController::new(
                FeedKey::Categories,
                interval,
                schedulers(FeedKey::Categories),
                Box::new(|payload| match payload {
                    Payload::Categories(rows) => Ok(rows),
                    other => Err(wrong_payload(FeedKey::Categories, &other)),
                }),
            ),
            workers: FeedController::new(
                FeedKey::WorkerPerformance,
                interval,
                schedulers(FeedKey::WorkerPerformance),
                Box::new(|payload| match payload {
                    Payload::ProcessingTimes(rows) => Ok(rows),
                    other => Err(wrong_payload(FeedKey::WorkerPerformance, &other)),
                }),
            ),
            insights: FeedController::new(
                FeedKey::Insights,
                interval,
                schedulers(FeedKey::Insights),
                Box::new(|payload| match payload {
                    Payload::Posts(resp) => Ok(Insights::from_posts(&resp.posts)),
                    other => Err(wrong_payload(FeedKey::Insights, &other)),
                }),
            ),
            activity: FeedController::new(
                FeedKey::AnalyticsActivity,
                interval,
                schedulers(FeedKey::AnalyticsActivity),
                Box::new(|payload| match payload {
                    Payload::Activity(points) => Ok(points),
                    other => Err(wrong_payload(FeedKey::AnalyticsActivity, &other)),
                }),
            ),
        }
    }

    fn handles_mut(&mut self) -> [&mut dyn FeedHandle; 4] {
        [
            &mut self.categories,
            &mut self.workers,
            &mut self.insights,
            &mut self.activity,
        ]
    }

    fn handles(&self) -> [&dyn FeedHandle; 4] {
        [&self.categories, &self.workers, &self.insights, &self.activity]
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
        info!("[analytics] mount, period={}", self.period);
        let period = self.period;
        period_group::mount_all(&mut self.handles_mut(), period)
    }

    pub fn set_period(&mut self, period: Period) -> Vec<FetchTicket> {
        if period == self.period {
            return Vec::new();
        }
        info!("[analytics] period {} -> {}", self.period, period);
        self.period = period;
        period_group::trigger_all(&mut self.handles_mut(), period)
    }

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
        info!("[analytics] teardown");
        period_group::teardown_all(&mut self.handles_mut());
    }

    pub fn categories(&self) -> &FeedState<Vec<Category>> {
        self.categories.state()
    }

    /// Category slices with their share of the total, for the pie/legend.
    pub fn category_shares(&self) -> Vec<CategoryShare> {
        self.categories
            .data()
            .map(|rows| category_shares(rows))
            .unwrap_or_default()
    }

    pub fn workers(&self) -> &FeedState<Vec<WorkerTiming>> {
        self.workers.state()
    }

    pub fn insights(&self) -> &FeedState<Insights> {
        self.insights.state()
    }

    pub fn activity(&self) -> &FeedState<Vec<ActivityPoint>> {
        self.activity.state()
    }
}
