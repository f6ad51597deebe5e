//! The one place controller state changes.
//!
//! `SyncHub` owns every view-model plus the notification bridge, routes
//! each [`SyncEvent`] to the controller that owns its feed, and forwards
//! the resulting tickets to a [`TicketSink`].  Only the active view is
//! mounted; switching views tears the old one down first.

use tracing::{debug, info};

use moddash_proto::config::Config;
use moddash_proto::protocol::{Filter, Period};

use crate::analytics::Analytics;
use crate::content_list::ContentList;
use crate::dashboard::Dashboard;
use crate::dispatch::TicketSink;
use crate::error::ValidationError;
use crate::event::{FeedKey, FetchTicket, SyncEvent};
use crate::feed::Applied;
use crate::notify::NotificationBridge;
use crate::scheduler::SchedulerFactory;
use crate::submission::Submission;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Dashboard,
    Content,
    Analytics,
}

impl View {
    pub const ALL: [View; 3] = [View::Dashboard, View::Content, View::Analytics];

    pub fn title(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Content => "Content",
            View::Analytics => "Analytics",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            View::Dashboard => View::Content,
            View::Content => View::Analytics,
            View::Analytics => View::Dashboard,
        }
    }
}

pub struct SyncHub {
    active: Option<View>,
    dashboard: Dashboard,
    analytics: Analytics,
    list: ContentList,
    submission: Submission,
    notifications: NotificationBridge,
    sink: Box<dyn TicketSink>,
}

impl SyncHub {
    pub fn new(
        config: &Config,
        schedulers: &mut SchedulerFactory<'_>,
        sink: Box<dyn TicketSink>,
    ) -> Self {
        let dashboard = Dashboard::new(
            Period::default(),
            config.polling.dashboard_interval(),
            config.dashboard.recent_limit,
            schedulers,
        );
        let analytics = Analytics::new(
            Period::default(),
            config.polling.analytics_interval(),
            schedulers,
        );
        let list = ContentList::new(
            config.list.page_size,
            config.polling.list_interval(),
            schedulers(FeedKey::ContentList),
        );
        Self {
            active: None,
            dashboard,
            analytics,
            list,
            submission: Submission::new(&config.submission),
            notifications: NotificationBridge::new(&config.notifications),
            sink,
        }
    }

    fn send(&mut self, tickets: impl IntoIterator<Item = FetchTicket>) {
        for ticket in tickets {
            self.sink.dispatch(ticket);
        }
    }

    pub fn active_view(&self) -> Option<View> {
        self.active
    }

    /// Mount `view`, tearing down whichever view was active.
    pub fn show(&mut self, view: View) {
        if self.active == Some(view) {
            return;
        }
        if let Some(old) = self.active.take() {
            self.unmount(old);
        }
        info!("[hub] showing {}", view.title());
        let tickets = match view {
            View::Dashboard => self.dashboard.mount(),
            View::Analytics => self.analytics.mount(),
            View::Content => vec![self.list.mount()],
        };
        self.active = Some(view);
        self.send(tickets);
    }

    fn unmount(&mut self, view: View) {
        match view {
            View::Dashboard => self.dashboard.teardown(),
            View::Analytics => self.analytics.teardown(),
            View::Content => self.list.teardown(),
        }
    }

    /// Period of the active view, if it has one.
    pub fn period(&self) -> Option<Period> {
        match self.active {
            Some(View::Dashboard) => Some(self.dashboard.period()),
            Some(View::Analytics) => Some(self.analytics.period()),
            _ => None,
        }
    }

    /// Change the period of the active view.  The content list has none.
    pub fn set_period(&mut self, period: Period) {
        let tickets = match self.active {
            Some(View::Dashboard) => self.dashboard.set_period(period),
            Some(View::Analytics) => self.analytics.set_period(period),
            _ => return,
        };
        self.send(tickets);
    }

    pub fn set_filter(&mut self, filter: Filter) {
        let ticket = self.list.set_filter(filter);
        self.send(ticket);
    }

    pub fn cycle_filter(&mut self) {
        let ticket = self.list.cycle_filter();
        self.send(ticket);
    }

    pub fn next_page(&mut self) -> bool {
        self.list.next_page()
    }

    pub fn prev_page(&mut self) -> bool {
        self.list.prev_page()
    }

    /// User-forced re-fetch of the active view.
    pub fn refresh(&mut self) {
        let tickets = match self.active {
            Some(View::Dashboard) => self.dashboard.refresh_all(),
            Some(View::Analytics) => self.analytics.refresh_all(),
            Some(View::Content) => self.list.refresh().into_iter().collect(),
            None => return,
        };
        self.send(tickets);
    }

    /// Route one event.  Returns whether any visible state changed.
    pub fn handle(&mut self, event: SyncEvent) -> bool {
        match event {
            SyncEvent::Tick(key) => {
                let ticket = if self.dashboard.owns(key) {
                    self.dashboard.on_tick(key)
                } else if self.analytics.owns(key) {
                    self.analytics.on_tick(key)
                } else {
                    self.list.on_tick()
                };
                let issued = ticket.is_some();
                self.send(ticket);
                issued
            }
            SyncEvent::Fetched {
                key,
                generation,
                outcome,
            } => {
                let applied = if self.dashboard.owns(key) {
                    self.dashboard
                        .on_fetched(key, generation, outcome, &mut self.notifications)
                } else if self.analytics.owns(key) {
                    self.analytics
                        .on_fetched(key, generation, outcome, &mut self.notifications)
                } else {
                    Some(self.list.on_fetched(generation, outcome, &mut self.notifications))
                };
                applied.is_some_and(|a| a != Applied::Stale)
            }
            SyncEvent::Submitted(outcome) => {
                if self
                    .submission
                    .finish(outcome, &mut self.notifications)
                    .is_some()
                {
                    debug!("[hub] submission landed, refreshing list and dashboard");
                    let mut tickets: Vec<FetchTicket> = self.list.refresh().into_iter().collect();
                    tickets.extend(self.dashboard.refresh_all());
                    self.send(tickets);
                }
                true
            }
        }
    }

    /// Validate the form and send it.  Validation errors stay on the form.
    pub fn submit(&mut self) -> Result<(), ValidationError> {
        let body = self.submission.begin()?;
        self.sink.submit(body);
        Ok(())
    }

    pub fn tick_notifications(&mut self) {
        self.notifications.tick();
    }

    /// Tear everything down.  Responses still in flight are discarded.
    pub fn shutdown(&mut self) {
        if let Some(view) = self.active.take() {
            self.unmount(view);
        }
        info!("[hub] shut down");
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn analytics(&self) -> &Analytics {
        &self.analytics
    }

    pub fn list(&self) -> &ContentList {
        &self.list
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    pub fn submission_mut(&mut self) -> &mut Submission {
        &mut self.submission
    }

    pub fn notifications(&self) -> &NotificationBridge {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationBridge {
        &mut self.notifications
    }
}
