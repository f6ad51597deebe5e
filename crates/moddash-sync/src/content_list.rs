//! Filtered content list: server-side filter, client-side pagination.
//!
//! The backend returns every item matching the filter in one call; the
//! list sorts it newest first and slices pages locally.  A filter change
//! always lands on page 1; a poll keeps the page unless the set shrank
//! below it.

use std::cmp::Ordering;
use std::ops::Range;
use std::time::Duration;

use tracing::{debug, info};

use moddash_proto::protocol::{Filter, Post, PostsResponse, Stats};

use crate::error::HttpError;
use crate::event::{FeedKey, FetchTicket, Generation, Payload, Request};
use crate::feed::{wrong_payload, Applied, FeedController, FeedState, FeedStatus};
use crate::notify::NotificationBridge;
use crate::scheduler::Scheduler;

/// `createdAt` descending, ties broken by `id` ascending.
pub fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| match b.created_at.cmp(&a.created_at) {
        Ordering::Equal => a.id.cmp(&b.id),
        other => other,
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    /// 1-based.
    pub current_page: usize,
    pub page_size: usize,
    pub total_items: usize,
}

impl PaginationState {
    pub fn new(page_size: usize) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
            total_items: 0,
        }
    }

    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.page_size)
    }

    fn last_page(&self) -> usize {
        self.total_pages().max(1)
    }

    /// Keep `current_page` inside `[1, max(1, total_pages)]`.
    pub fn clamp(&mut self) {
        self.current_page = self.current_page.clamp(1, self.last_page());
    }

    pub fn set_total(&mut self, total_items: usize) {
        self.total_items = total_items;
        self.clamp();
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    /// Jump to `page`, clamped.  Returns whether the page changed.
    pub fn go_to(&mut self, page: usize) -> bool {
        let before = self.current_page;
        self.current_page = page;
        self.clamp();
        self.current_page != before
    }

    pub fn next(&mut self) -> bool {
        self.go_to(self.current_page.saturating_add(1))
    }

    pub fn prev(&mut self) -> bool {
        self.go_to(self.current_page.saturating_sub(1))
    }

    /// Index range of the current page within the full set.
    pub fn range(&self) -> Range<usize> {
        let start = self
            .current_page
            .saturating_sub(1)
            .saturating_mul(self.page_size)
            .min(self.total_items);
        let end = start.saturating_add(self.page_size).min(self.total_items);
        start..end
    }
}

pub struct ContentList {
    filter: Filter,
    /// Filter of the data currently held, which lags `filter` while a
    /// re-fetch is in flight.
    loaded_filter: Option<Filter>,
    feed: FeedController<PostsResponse>,
    pagination: PaginationState,
}

impl ContentList {
    pub fn new(page_size: usize, interval: Duration, scheduler: Box<dyn Scheduler>) -> Self {
        Self {
            filter: Filter::All,
            loaded_filter: None,
            feed: FeedController::new(
                FeedKey::ContentList,
                interval,
                scheduler,
                Box::new(|payload| match payload {
                    Payload::Posts(mut resp) => {
                        sort_newest_first(&mut resp.posts);
                        Ok(resp)
                    }
                    other => Err(wrong_payload(FeedKey::ContentList, &other)),
                }),
            ),
            pagination: PaginationState::new(page_size),
        }
    }

    fn request(&self) -> Request {
        Request::Posts {
            period: None,
            filter: Some(self.filter),
        }
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn pagination(&self) -> &PaginationState {
        &self.pagination
    }

    pub fn state(&self) -> &FeedState<PostsResponse> {
        self.feed.state()
    }

    pub fn status(&self) -> FeedStatus {
        self.feed.state().status
    }

    pub fn is_mounted(&self) -> bool {
        self.feed.is_mounted()
    }

    pub fn mount(&mut self) -> FetchTicket {
        info!("[list] mount, filter={}", self.filter);
        self.feed.mount(self.request())
    }

    /// Change the filter: re-fetch and go back to page 1, whatever the
    /// size of the new set.
    pub fn set_filter(&mut self, filter: Filter) -> Option<FetchTicket> {
        if filter == self.filter {
            return None;
        }
        info!("[list] filter {} -> {}", self.filter, filter);
        self.filter = filter;
        self.pagination.reset();
        self.feed.trigger(self.request())
    }

    pub fn cycle_filter(&mut self) -> Option<FetchTicket> {
        self.set_filter(self.filter.next())
    }

    /// Re-fetch with the current filter, keeping the page.
    pub fn refresh(&mut self) -> Option<FetchTicket> {
        self.feed.trigger(self.request())
    }

    pub fn on_tick(&mut self) -> Option<FetchTicket> {
        self.refresh()
    }

    pub fn on_fetched(
        &mut self,
        generation: Generation,
        outcome: Result<Payload, HttpError>,
        notifications: &mut NotificationBridge,
    ) -> Applied {
        let applied = self.feed.apply(generation, outcome, notifications);
        if applied == Applied::Fresh {
            let total = self.items().len();
            // Pages turned over the previous filter's data do not carry over.
            if self.loaded_filter != Some(self.filter) {
                self.pagination.reset();
            }
            self.loaded_filter = Some(self.filter);
            self.pagination.set_total(total);
            debug!(
                "[list] {} items, page {}/{}",
                total,
                self.pagination.current_page,
                self.pagination.total_pages()
            );
        }
        applied
    }

    /// Full sorted set for the loaded filter.
    pub fn items(&self) -> &[Post] {
        self.feed
            .data()
            .map(|resp| resp.posts.as_slice())
            .unwrap_or_default()
    }

    /// Counters returned with the last list response, for filter badges.
    pub fn stats(&self) -> Option<&Stats> {
        self.feed.data().map(|resp| &resp.stats)
    }

    /// The current page's slice.  Pure: repeated calls return the same items.
    pub fn current_page_items(&self) -> &[Post] {
        let items = self.items();
        let range = self.pagination.range();
        items.get(range).unwrap_or_default()
    }

    pub fn should_paginate(&self) -> bool {
        self.pagination.total_pages() > 1
    }

    /// True while the held data belongs to a previous filter.
    pub fn is_showing_stale_filter(&self) -> bool {
        self.loaded_filter.is_some_and(|f| f != self.filter)
    }

    pub fn set_page(&mut self, page: usize) -> bool {
        self.pagination.go_to(page)
    }

    pub fn next_page(&mut self) -> bool {
        self.pagination.next()
    }

    pub fn prev_page(&mut self) -> bool {
        self.pagination.prev()
    }

    pub fn teardown(&mut self) {
        self.feed.teardown();
    }
}
