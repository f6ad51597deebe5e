//! Display-side numbers derived from backend data.
//!
//! These are the only places a counter is computed locally; `Stats::total`
//! itself is always taken from the backend as-is.

use chrono::{DateTime, Utc};

use crate::protocol::{ActivityPoint, Category, Post, PostStatus, ServerStatusMap, Stats, WorkerTiming};

/// `part / whole` as a whole percentage, rounded half up.  Zero when `whole` is zero.
pub fn percent(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}

impl Stats {
    pub fn approval_rate(&self) -> u32 {
        percent(self.approved, self.total)
    }

    pub fn rejection_rate(&self) -> u32 {
        percent(self.rejected, self.total)
    }

    /// Items still waiting on a verdict.
    pub fn pending_review(&self) -> u64 {
        self.pending + self.processing
    }
}

// ── Servers ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServerSummary {
    pub online: usize,
    pub total: usize,
}

impl ServerSummary {
    pub fn from_status(status: &ServerStatusMap) -> Self {
        Self {
            online: status.values().filter(|s| s.is_online()).count(),
            total: status.len(),
        }
    }

    pub fn percent(&self) -> u32 {
        percent(self.online as u64, self.total as u64)
    }

    /// `online/total`, e.g. `1/2`.
    pub fn ratio_label(&self) -> String {
        format!("{}/{}", self.online, self.total)
    }
}

// ── Categories ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryShare {
    pub name: String,
    pub value: u64,
    pub percent: u32,
}

pub fn category_shares(categories: &[Category]) -> Vec<CategoryShare> {
    let total: u64 = categories.iter().map(|c| c.value).sum();
    categories
        .iter()
        .map(|c| CategoryShare {
            name: c.name.clone(),
            value: c.value,
            percent: percent(c.value, total),
        })
        .collect()
}

// ── Workers ───────────────────────────────────────────────────────────────────

/// Colour band for a worker's mean processing time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingBand {
    Fast,
    Normal,
    Slow,
}

impl WorkerTiming {
    pub fn approval_rate(&self) -> u32 {
        percent(self.approved, self.processed)
    }

    pub fn band(&self) -> TimingBand {
        if self.average_time < 2.0 {
            TimingBand::Fast
        } else if self.average_time < 3.0 {
            TimingBand::Normal
        } else {
            TimingBand::Slow
        }
    }
}

/// Bar length in percent of the slowest worker, one entry per input row.
pub fn timing_bar_widths(timings: &[WorkerTiming]) -> Vec<f64> {
    let max = timings
        .iter()
        .map(|t| t.average_time)
        .fold(0.0_f64, f64::max);
    timings
        .iter()
        .map(|t| {
            if max > 0.0 {
                t.average_time / max * 100.0
            } else {
                0.0
            }
        })
        .collect()
}

// ── Activity ──────────────────────────────────────────────────────────────────

/// Largest single counter across the series; the chart scales against it.
pub fn activity_peak(points: &[ActivityPoint]) -> u64 {
    points
        .iter()
        .flat_map(|p| [p.approved, p.rejected, p.pending, p.needs_review])
        .max()
        .unwrap_or(0)
}

/// `value` as a fraction (0.0..=1.0) of `peak`.
pub fn normalize(value: u64, peak: u64) -> f64 {
    if peak == 0 {
        0.0
    } else {
        value as f64 / peak as f64
    }
}

// ── Insights ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Insights {
    /// Mean processing time in seconds over items that report one.
    pub avg_processing_secs: f64,
    pub approval_rate: u32,
    pub content_volume: usize,
}

impl Insights {
    pub fn from_posts(posts: &[Post]) -> Self {
        let timed: Vec<f64> = posts
            .iter()
            .filter_map(|p| p.processing_time)
            .filter(|ms| *ms > 0.0)
            .collect();
        let avg_processing_secs = if timed.is_empty() {
            0.0
        } else {
            timed.iter().sum::<f64>() / timed.len() as f64 / 1000.0
        };
        let approved = posts
            .iter()
            .filter(|p| p.status == PostStatus::Approved)
            .count();
        Self {
            avg_processing_secs,
            approval_rate: percent(approved as u64, posts.len() as u64),
            content_volume: posts.len(),
        }
    }

    pub fn avg_processing_label(&self) -> String {
        format!("{:.1}s", self.avg_processing_secs)
    }

    pub fn approval_label(&self) -> String {
        format!("{}%", self.approval_rate)
    }
}

// ── Time ──────────────────────────────────────────────────────────────────────

/// Coarse relative age, e.g. `3 minutes ago`.
pub fn time_ago(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - at).num_seconds().max(0);
    if seconds < 60 {
        return format!("{} seconds ago", seconds);
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{} minutes ago", minutes);
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{} hours ago", hours);
    }
    format!("{} days ago", hours / 24)
}
