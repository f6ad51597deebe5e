//! Notification bridge: transient operator messages.
//!
//! One-way sink for sync failures and user-action outcomes.  The bridge
//! alone owns expiry and de-duplication: an event tagged with a `source`
//! never has more than one active entry, and repeat enqueues from that
//! source inside the de-dup window are swallowed even after a dismissal.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use tracing::trace;

use moddash_proto::config::NotificationConfig;

pub type NotificationId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub kind: NotificationKind,
    pub title: String,
    pub message: Option<String>,
    /// Persistent events stay until dismissed.
    pub persistent: bool,
    /// Logical origin (e.g. a feed label) used for de-duplication.
    pub source: Option<String>,
}

impl NotificationEvent {
    pub fn new(kind: NotificationKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: None,
            persistent: false,
            source: None,
        }
    }

    pub fn success(title: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, title)
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, title)
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(NotificationKind::Warning, title)
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, title)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }

    pub fn from_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: NotificationId,
    pub event: NotificationEvent,
    expires: Option<Instant>,
}

impl Notification {
    pub fn expires(&self) -> Option<Instant> {
        self.expires
    }
}

pub struct NotificationBridge {
    active: VecDeque<Notification>,
    next_id: NotificationId,
    expire_after: Duration,
    dedup_window: Duration,
    max_visible: usize,
    /// Last id and enqueue time per source.
    recent_sources: HashMap<String, (NotificationId, Instant)>,
}

impl NotificationBridge {
    pub fn new(config: &NotificationConfig) -> Self {
        Self {
            active: VecDeque::new(),
            next_id: 1,
            expire_after: config.expire_after(),
            dedup_window: config.dedup_window(),
            max_visible: config.max_visible.max(1),
            recent_sources: HashMap::new(),
        }
    }

    pub fn enqueue(&mut self, event: NotificationEvent) -> NotificationId {
        self.enqueue_at(event, Instant::now())
    }

    pub fn enqueue_at(&mut self, event: NotificationEvent, now: Instant) -> NotificationId {
        let expires = (!event.persistent).then(|| now + self.expire_after);

        if let Some(source) = event.source.clone() {
            // Coalesce into the live entry from the same source.
            if let Some(existing) = self
                .active
                .iter_mut()
                .find(|n| n.event.source.as_deref() == Some(source.as_str()))
            {
                existing.event = event;
                existing.expires = expires;
                let id = existing.id;
                self.recent_sources.insert(source, (id, now));
                trace!("[notify] coalesced into #{}", id);
                return id;
            }
            if let Some((id, at)) = self.recent_sources.get(&source) {
                if now.saturating_duration_since(*at) < self.dedup_window {
                    trace!("[notify] suppressed repeat from {}", source);
                    return *id;
                }
            }
        } else {
            // Remove duplicates (same text)
            self.active.retain(|n| {
                n.event.source.is_some()
                    || n.event.title != event.title
                    || n.event.message != event.message
            });
        }

        let id = self.next_id;
        self.next_id += 1;
        if let Some(source) = &event.source {
            self.recent_sources.insert(source.clone(), (id, now));
        }
        self.active.push_back(Notification { id, event, expires });

        // Cap queue
        while self.active.len() > self.max_visible * 2 {
            self.active.pop_front();
        }
        id
    }

    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        let before = self.active.len();
        self.active.retain(|n| n.id != id);
        self.active.len() != before
    }

    pub fn dismiss_all(&mut self) {
        self.active.clear();
    }

    /// Remove expired entries.  Call each UI tick.
    pub fn tick(&mut self) {
        self.expire_at(Instant::now());
    }

    pub fn expire_at(&mut self, now: Instant) {
        self.active
            .retain(|n| n.expires.map_or(true, |expires| expires > now));
        let window = self.dedup_window;
        self.recent_sources
            .retain(|_, (_, at)| now.saturating_duration_since(*at) < window);
    }

    /// Newest first, at most `max_visible`.
    pub fn visible(&self) -> impl Iterator<Item = &Notification> {
        self.active.iter().rev().take(self.max_visible)
    }

    pub fn get(&self, id: NotificationId) -> Option<&Notification> {
        self.active.iter().find(|n| n.id == id)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Active entries tagged with `source`.
    pub fn count_from(&self, source: &str) -> usize {
        self.active
            .iter()
            .filter(|n| n.event.source.as_deref() == Some(source))
            .count()
    }
}

impl Default for NotificationBridge {
    fn default() -> Self {
        Self::new(&NotificationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bridge() -> NotificationBridge {
        NotificationBridge::new(&NotificationConfig {
            expire_secs: 5,
            dedup_window_secs: 3,
            max_visible: 4,
        })
    }

    #[test]
    fn test_non_persistent_events_expire() {
        let mut b = bridge();
        let t0 = Instant::now();
        let id = b.enqueue_at(NotificationEvent::info("hello"), t0);
        let pinned = b.enqueue_at(NotificationEvent::warning("pinned").persistent(), t0);
        b.expire_at(t0 + Duration::from_secs(4));
        assert!(b.get(id).is_some());
        b.expire_at(t0 + Duration::from_secs(6));
        assert!(b.get(id).is_none());
        assert!(b.get(pinned).is_some());
        assert!(b.dismiss(pinned));
        assert!(!b.dismiss(pinned));
        assert!(b.is_empty());
    }

    #[test]
    fn test_same_source_has_one_active_entry() {
        let mut b = bridge();
        let t0 = Instant::now();
        let ev = || NotificationEvent::error("Statistics unavailable").from_source("stats");
        let first = b.enqueue_at(ev(), t0);
        for i in 1..20 {
            let id = b.enqueue_at(ev(), t0 + Duration::from_millis(i * 500));
            assert_eq!(id, first);
        }
        assert_eq!(b.count_from("stats"), 1);
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn test_dismissed_source_is_suppressed_inside_window() {
        let mut b = bridge();
        let t0 = Instant::now();
        let ev = || NotificationEvent::error("down").from_source("status");
        let id = b.enqueue_at(ev(), t0);
        b.dismiss(id);
        assert_eq!(b.enqueue_at(ev(), t0 + Duration::from_secs(1)), id);
        assert!(b.is_empty());

        let later = b.enqueue_at(ev(), t0 + Duration::from_secs(4));
        assert_ne!(later, id);
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn test_unsourced_duplicates_replace_each_other() {
        let mut b = bridge();
        let t0 = Instant::now();
        b.enqueue_at(NotificationEvent::success("Saved"), t0);
        b.enqueue_at(NotificationEvent::success("Saved"), t0);
        b.enqueue_at(NotificationEvent::success("Other"), t0);
        assert_eq!(b.len(), 2);
    }

    #[test]
    fn test_visible_is_newest_first_and_capped() {
        let mut b = bridge();
        let t0 = Instant::now();
        for i in 0..12 {
            b.enqueue_at(NotificationEvent::info(format!("n{}", i)), t0);
        }
        assert_eq!(b.len(), 8);
        let titles: Vec<&str> = b.visible().map(|n| n.event.title.as_str()).collect();
        assert_eq!(titles, vec!["n11", "n10", "n9", "n8"]);
    }
}
