//! Polling timers, one per controller.
//!
//! A scheduler only says "tick"; the owning controller decides what a tick
//! means.  `IntervalScheduler` is the tokio-backed one used at runtime, and
//! `ManualScheduler` records start/stop so tests can deliver ticks by hand.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, trace};

use crate::event::{FeedKey, SyncEvent};

pub trait Scheduler: Send {
    /// Begin ticking every `every`, replacing any running timer.
    /// The first tick arrives one full interval after the call.
    fn start(&mut self, every: Duration);

    /// Stop ticking.  Idempotent.
    fn stop(&mut self);

    fn is_running(&self) -> bool;
}

/// Builds the scheduler for a given feed.
pub type SchedulerFactory<'a> = dyn FnMut(FeedKey) -> Box<dyn Scheduler> + 'a;

// ── IntervalScheduler ─────────────────────────────────────────────────────────

/// Sends `SyncEvent::Tick(key)` into the event channel on a tokio interval.
pub struct IntervalScheduler {
    key: FeedKey,
    tx: mpsc::Sender<SyncEvent>,
    task: Option<JoinHandle<()>>,
}

impl IntervalScheduler {
    pub fn new(key: FeedKey, tx: mpsc::Sender<SyncEvent>) -> Self {
        Self {
            key,
            tx,
            task: None,
        }
    }

    /// Factory closure for aggregators.
    pub fn factory(tx: mpsc::Sender<SyncEvent>) -> impl FnMut(FeedKey) -> Box<dyn Scheduler> {
        move |key| Box::new(IntervalScheduler::new(key, tx.clone())) as Box<dyn Scheduler>
    }
}

impl Scheduler for IntervalScheduler {
    fn start(&mut self, every: Duration) {
        self.stop();
        let key = self.key;
        let tx = self.tx.clone();
        debug!("[timer:{}] every {:?}", key.label(), every);
        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + every, every);
            // A slow consumer gets one tick, not a burst of catch-up ticks.
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                trace!("[timer:{}] tick", key.label());
                if tx.send(SyncEvent::Tick(key)).await.is_err() {
                    break;
                }
            }
        }));
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("[timer:{}] stopped", self.key.label());
        }
    }

    fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for IntervalScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

// ── ManualScheduler ───────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct ManualTimer {
    every: Option<Duration>,
    starts: usize,
    stops: usize,
}

/// Scheduler that never fires on its own.  Clones share state, so a test
/// can keep one handle while the controller owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    timer: Arc<Mutex<ManualTimer>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn timer(&self) -> MutexGuard<'_, ManualTimer> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The interval passed to the last `start`, while running.
    pub fn interval(&self) -> Option<Duration> {
        self.timer().every
    }

    pub fn starts(&self) -> usize {
        self.timer().starts
    }

    pub fn stops(&self) -> usize {
        self.timer().stops
    }
}

impl Scheduler for ManualScheduler {
    fn start(&mut self, every: Duration) {
        let mut timer = self.timer();
        timer.every = Some(every);
        timer.starts += 1;
    }

    fn stop(&mut self) {
        let mut timer = self.timer();
        if timer.every.take().is_some() {
            timer.stops += 1;
        }
    }

    fn is_running(&self) -> bool {
        self.timer().every.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_scheduler_shares_state() {
        let handle = ManualScheduler::new();
        let mut owned: Box<dyn Scheduler> = Box::new(handle.clone());
        owned.start(Duration::from_secs(10));
        assert!(handle.is_running());
        assert_eq!(handle.interval(), Some(Duration::from_secs(10)));
        owned.stop();
        owned.stop();
        assert!(!handle.is_running());
        assert_eq!(handle.starts(), 1);
        assert_eq!(handle.stops(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_scheduler_ticks_after_full_interval() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut scheduler = IntervalScheduler::new(FeedKey::Stats, tx);
        scheduler.start(Duration::from_secs(10));
        assert!(scheduler.is_running());

        tokio::time::advance(Duration::from_secs(9)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::advance(Duration::from_secs(2)).await;
        let event = rx.recv().await;
        assert!(matches!(event, Some(SyncEvent::Tick(FeedKey::Stats))));

        scheduler.stop();
        assert!(!scheduler.is_running());
    }
}
