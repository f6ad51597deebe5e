//! Shared plumbing for aggregators whose child feeds all follow one period.

use moddash_proto::protocol::Period;
use tracing::debug;

use crate::error::HttpError;
use crate::event::{FeedKey, FetchTicket, Generation, Payload};
use crate::feed::{Applied, FeedHandle, FeedStatus};
use crate::notify::NotificationBridge;

pub(crate) fn mount_all(feeds: &mut [&mut dyn FeedHandle], period: Period) -> Vec<FetchTicket> {
    feeds
        .iter_mut()
        .filter_map(|feed| {
            let request = feed.key().period_request(period)?;
            Some(feed.mount(request))
        })
        .collect()
}

/// Re-trigger every child for `period` in one pass, so no child is left
/// on the previous period once this returns.
pub(crate) fn trigger_all(feeds: &mut [&mut dyn FeedHandle], period: Period) -> Vec<FetchTicket> {
    feeds
        .iter_mut()
        .filter_map(|feed| {
            let request = feed.key().period_request(period)?;
            feed.trigger(request)
        })
        .collect()
}

/// A child's own timer fired.  Only that child re-fetches.
pub(crate) fn route_tick(
    feeds: &mut [&mut dyn FeedHandle],
    key: FeedKey,
    period: Period,
) -> Option<FetchTicket> {
    let feed = feeds.iter_mut().find(|f| f.key() == key)?;
    let request = feed.key().period_request(period)?;
    feed.trigger(request)
}

pub(crate) fn route_fetched(
    feeds: &mut [&mut dyn FeedHandle],
    key: FeedKey,
    generation: Generation,
    outcome: Result<Payload, HttpError>,
    notifications: &mut NotificationBridge,
) -> Option<Applied> {
    let feed = feeds.iter_mut().find(|f| f.key() == key)?;
    let applied = feed.apply(generation, outcome, notifications);
    if applied == Applied::Stale {
        debug!("[group] {} response discarded", key.label());
    }
    Some(applied)
}

pub(crate) fn teardown_all(feeds: &mut [&mut dyn FeedHandle]) {
    for feed in feeds.iter_mut() {
        feed.teardown();
    }
}

/// One status for the whole group: Ready once any child has data,
/// otherwise Loading, then Error, then Idle.
pub(crate) fn unified_status(feeds: &[&dyn FeedHandle]) -> FeedStatus {
    if feeds.iter().any(|f| f.has_data()) {
        FeedStatus::Ready
    } else if feeds.iter().any(|f| f.status() == FeedStatus::Loading) {
        FeedStatus::Loading
    } else if feeds.iter().any(|f| f.status() == FeedStatus::Error) {
        FeedStatus::Error
    } else {
        FeedStatus::Idle
    }
}
