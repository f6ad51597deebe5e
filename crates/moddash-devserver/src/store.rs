//! In-memory moderation backend state.
//!
//! Everything the HTTP layer serves is computed from `Store::posts` on
//! each request; nothing is cached.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use tokio::sync::RwLock;
use tracing::debug;

use moddash_proto::protocol::{
    ActivityPoint, Category, Filter, NewPost, Period, Post, PostStatus, ServerState,
    ServerStatusMap, Stats, WorkerTiming,
};

pub const SERVERS: [&str; 3] = ["server1", "server2", "server3"];

const SAMPLE_TITLES: &[&str] = &[
    "Weekly product update",
    "Community guidelines feedback",
    "Review of the new headphones",
    "Local election coverage",
    "How we scaled our queue",
    "Photo dump from the meetup",
    "Question about refunds",
    "Recipe: spiced lentil soup",
    "Breaking: transit strike",
    "Hot take on tabs vs spaces",
];

const SAMPLE_AUTHORS: &[&str] = &["ana", "bo", "chen", "dara", "eli", "fatima", "gus", "hana"];

const CATEGORIES: &[&str] = &["general", "news", "article", "blog", "review", "other"];

const REVIEW_REASONS: &[&str] = &[
    "Borderline language",
    "Possible spam link",
    "Needs fact check",
];

/// Devserver state.  Wrap in [`SharedStore`] to serve it.
#[derive(Debug)]
pub struct Store {
    posts: Vec<Post>,
    next_id: u64,
    offline: Vec<String>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            posts: Vec::new(),
            next_id: 1,
            offline: Vec::new(),
        }
    }

    /// `count` items spread over the last 30 days, most of them already moderated.
    pub fn seeded(count: usize, now: DateTime<Utc>, rng: &mut impl Rng) -> Self {
        let mut store = Self::new();
        for _ in 0..count {
            let age = Duration::minutes(rng.gen_range(1..60 * 24 * 30));
            let created_at = now - age;
            let new = NewPost {
                title: pick(SAMPLE_TITLES, rng).to_string(),
                content: "Seeded sample content.".to_string(),
                author: pick(SAMPLE_AUTHORS, rng).to_string(),
                category: pick(CATEGORIES, rng).to_string(),
                server: pick(&SERVERS, rng).to_string(),
            };
            let mut post = store.next_post(new, created_at);
            if rng.gen_bool(0.8) {
                post.status = PostStatus::Processing;
                post.worker = Some(format!("worker-{}", rng.gen_range(1..=4)));
                settle(&mut post, created_at + Duration::seconds(5), rng);
            }
            store.posts.push(post);
        }
        store
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    fn next_post(&mut self, new: NewPost, created_at: DateTime<Utc>) -> Post {
        let id = self.next_id.to_string();
        self.next_id += 1;
        Post {
            id,
            title: new.title,
            content: new.content,
            author: new.author,
            status: PostStatus::Pending,
            server: new.server,
            worker: None,
            moderation_details: None,
            created_at,
            completed_at: None,
            toxicity_score: None,
            review_reason: None,
            category: Some(new.category),
            processing_time: None,
        }
    }

    pub fn create(&mut self, new: NewPost, now: DateTime<Utc>) -> Post {
        let post = self.next_post(new, now);
        debug!("[store] created post {}", post.id);
        self.posts.push(post.clone());
        post
    }

    fn in_period<'a>(
        &'a self,
        period: Option<Period>,
        now: DateTime<Utc>,
    ) -> impl Iterator<Item = &'a Post> + 'a {
        let since = period.map(|p| now - p.window());
        self.posts
            .iter()
            .filter(move |p| since.map_or(true, |since| p.created_at >= since))
    }

    /// Items inside `period` matching `filter`, plus counters over the
    /// whole period so filter badges stay meaningful.
    pub fn query(
        &self,
        period: Option<Period>,
        filter: Option<Filter>,
        now: DateTime<Utc>,
    ) -> (Vec<Post>, Stats) {
        let window: Vec<&Post> = self.in_period(period, now).collect();
        let stats = stats_of(window.iter().copied());
        let filter = filter.unwrap_or_default();
        let posts = window
            .into_iter()
            .filter(|p| filter.matches(&p.status))
            .cloned()
            .collect();
        (posts, stats)
    }

    pub fn server_status(&self) -> ServerStatusMap {
        SERVERS
            .iter()
            .map(|name| {
                let state = if self.offline.iter().any(|o| o.as_str() == *name) {
                    ServerState::Offline
                } else if self
                    .posts
                    .iter()
                    .any(|p| p.server == *name && p.status == PostStatus::Processing)
                {
                    ServerState::Busy
                } else {
                    ServerState::Idle
                };
                (name.to_string(), state)
            })
            .collect()
    }

    pub fn set_offline(&mut self, server: &str, offline: bool) {
        self.offline.retain(|s| s != server);
        if offline {
            self.offline.push(server.to_string());
        }
    }

    /// Counters per time bucket; the bucket size depends on the period.
    pub fn activity(&self, period: Period, now: DateTime<Utc>) -> Vec<ActivityPoint> {
        let (count, step, fmt) = match period {
            Period::Day => (24, Duration::hours(1), "%H:00"),
            Period::Week => (7, Duration::days(1), "%a"),
            Period::Month => (30, Duration::days(1), "%m-%d"),
            Period::Year => (12, Duration::days(30), "%b"),
        };
        let start = now - step * count;
        let mut points: Vec<ActivityPoint> = (0..count)
            .map(|i| ActivityPoint {
                day: (start + step * i).format(fmt).to_string(),
                ..ActivityPoint::default()
            })
            .collect();

        for post in self.posts.iter().filter(|p| p.created_at >= start) {
            let idx = ((post.created_at - start).num_seconds() / step.num_seconds()) as usize;
            let Some(point) = points.get_mut(idx) else {
                continue;
            };
            match post.status {
                PostStatus::Approved => point.approved += 1,
                PostStatus::Rejected => point.rejected += 1,
                PostStatus::NeedsReview => point.needs_review += 1,
                _ => point.pending += 1,
            }
        }
        points
    }

    pub fn processing_times(&self, period: Period, now: DateTime<Utc>) -> Vec<WorkerTiming> {
        let mut by_worker: BTreeMap<&str, (WorkerTiming, f64)> = BTreeMap::new();
        for post in self.in_period(Some(period), now) {
            let (Some(worker), true) = (post.worker.as_deref(), post.status.is_settled()) else {
                continue;
            };
            let (row, total_ms) = by_worker.entry(worker).or_insert_with(|| {
                (
                    WorkerTiming {
                        worker: worker.to_string(),
                        ..WorkerTiming::default()
                    },
                    0.0,
                )
            });
            row.processed += 1;
            match post.status {
                PostStatus::Approved => row.approved += 1,
                PostStatus::Rejected => row.rejected += 1,
                _ => row.needs_review += 1,
            }
            *total_ms += post.processing_time.unwrap_or(0.0);
        }
        by_worker
            .into_values()
            .map(|(mut row, total_ms)| {
                if row.processed > 0 {
                    let secs = total_ms / row.processed as f64 / 1000.0;
                    row.average_time = (secs * 100.0).round() / 100.0;
                }
                row
            })
            .collect()
    }

    pub fn categories(&self, period: Period, now: DateTime<Utc>) -> Vec<Category> {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for post in self.in_period(Some(period), now) {
            let name = post.category.clone().unwrap_or_else(|| "other".to_string());
            *counts.entry(name).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(name, value)| Category { name, value })
            .collect()
    }

    /// One round of the simulated worker pool: settle items in processing,
    /// then hand pending items to idle workers.
    pub fn moderate_step(&mut self, workers: usize, now: DateTime<Utc>, rng: &mut impl Rng) {
        let mut busy: Vec<String> = Vec::new();
        for post in self
            .posts
            .iter_mut()
            .filter(|p| p.status == PostStatus::Processing)
        {
            settle(post, now, rng);
        }

        let offline = self.offline.clone();
        for post in self.posts.iter_mut().filter(|p| {
            p.status == PostStatus::Pending && !offline.iter().any(|o| *o == p.server)
        }) {
            let Some(worker) = (1..=workers)
                .map(|i| format!("worker-{}", i))
                .find(|w| !busy.contains(w))
            else {
                break;
            };
            debug!("[workers] {} picks up post {}", worker, post.id);
            post.status = PostStatus::Processing;
            post.worker = Some(worker.clone());
            busy.push(worker);
        }
    }
}

fn pick<'a>(items: &[&'a str], rng: &mut impl Rng) -> &'a str {
    items.choose(rng).copied().unwrap_or("general")
}

fn settle(post: &mut Post, now: DateTime<Utc>, rng: &mut impl Rng) {
    let roll: f64 = rng.gen();
    let toxicity: f64 = rng.gen_range(0.0..1.0);
    let (status, details) = if roll < 0.7 {
        (PostStatus::Approved, "No policy violations found")
    } else if roll < 0.9 {
        (PostStatus::Rejected, "Violates content policy")
    } else {
        (PostStatus::NeedsReview, "Flagged for manual review")
    };
    if status == PostStatus::NeedsReview {
        post.review_reason = Some(pick(REVIEW_REASONS, rng).to_string());
    }
    post.status = status;
    post.moderation_details = Some(details.to_string());
    post.toxicity_score = Some((toxicity * 100.0).round() / 100.0);
    post.processing_time = Some(rng.gen_range(800.0..4500.0_f64).round());
    post.completed_at = Some(now);
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

pub fn stats_of<'a>(posts: impl IntoIterator<Item = &'a Post>) -> Stats {
    let mut stats = Stats::default();
    for post in posts {
        stats.total += 1;
        match post.status {
            PostStatus::Approved => stats.approved += 1,
            PostStatus::Rejected => stats.rejected += 1,
            PostStatus::Pending => stats.pending += 1,
            PostStatus::Processing => stats.processing += 1,
            PostStatus::NeedsReview => stats.needs_review += 1,
            PostStatus::Unknown => {}
        }
    }
    stats
}

/// Cheaply clonable handle shared by handlers and the worker task.
#[derive(Clone, Default)]
pub struct SharedStore {
    pub inner: Arc<RwLock<Store>>,
    created: Arc<AtomicU64>,
}

impl SharedStore {
    pub fn new(store: Store) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
            created: Arc::new(AtomicU64::new(0)),
        }
    }

    pub(crate) fn record_create(&self) {
        self.created.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of successful `POST /api/posts` calls served.
    pub fn created_count(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn new_post(title: &str, server: &str) -> NewPost {
        NewPost {
            title: title.into(),
            content: "c".into(),
            author: "a".into(),
            category: "news".into(),
            server: server.into(),
        }
    }

    #[test]
    fn test_query_filters_by_window_and_status() {
        let now = Utc::now();
        let mut store = Store::new();
        store.create(new_post("fresh", "server1"), now - Duration::hours(2));
        store.create(new_post("old", "server1"), now - Duration::days(10));

        let (day, stats) = store.query(Some(Period::Day), None, now);
        assert_eq!(day.len(), 1);
        assert_eq!(stats.total, 1);

        let (all, _) = store.query(None, Some(Filter::Pending), now);
        assert_eq!(all.len(), 2);
        let (approved, stats) = store.query(Some(Period::Month), Some(Filter::Approved), now);
        assert!(approved.is_empty());
        assert_eq!(stats.pending, 2);
    }

    #[test]
    fn test_workers_move_items_through_pipeline() {
        let mut rng = StdRng::seed_from_u64(7);
        let now = Utc::now();
        let mut store = Store::new();
        for i in 0..3 {
            store.create(new_post(&format!("p{}", i), "server1"), now);
        }
        store.moderate_step(2, now, &mut rng);
        let processing = store
            .posts()
            .iter()
            .filter(|p| p.status == PostStatus::Processing)
            .count();
        assert_eq!(processing, 2);
        assert_eq!(store.server_status()["server1"], ServerState::Busy);

        store.moderate_step(2, now, &mut rng);
        let settled = store.posts().iter().filter(|p| p.status.is_settled()).count();
        assert_eq!(settled, 2);
        assert!(store
            .posts()
            .iter()
            .filter(|p| p.status.is_settled())
            .all(|p| p.processing_time.is_some() && p.completed_at.is_some()));
    }

    #[test]
    fn test_offline_server_is_reported_and_skipped() {
        let mut rng = StdRng::seed_from_u64(1);
        let now = Utc::now();
        let mut store = Store::new();
        store.create(new_post("p", "server2"), now);
        store.set_offline("server2", true);
        store.moderate_step(4, now, &mut rng);
        assert_eq!(store.posts()[0].status, PostStatus::Pending);
        assert_eq!(store.server_status()["server2"], ServerState::Offline);
        assert_eq!(store.server_status()["server3"], ServerState::Idle);
    }

    #[test]
    fn test_activity_buckets_cover_period() {
        let now = Utc::now();
        let mut store = Store::new();
        store.create(new_post("p", "server1"), now - Duration::minutes(30));
        let week = store.activity(Period::Week, now);
        assert_eq!(week.len(), 7);
        assert_eq!(week.last().map(|p| p.pending), Some(1));
        assert_eq!(store.activity(Period::Day, now).len(), 24);
    }

    #[test]
    fn test_seeded_store_reports_worker_rows() {
        let mut rng = StdRng::seed_from_u64(42);
        let now = Utc::now();
        let store = Store::seeded(60, now, &mut rng);
        assert_eq!(store.posts().len(), 60);
        let rows = store.processing_times(Period::Year, now);
        assert!(!rows.is_empty());
        assert!(rows.iter().all(|r| r.processed == r.approved + r.rejected + r.needs_review));
        let cats: u64 = store.categories(Period::Year, now).iter().map(|c| c.value).sum();
        assert_eq!(cats, 60);
    }
}
