//! Dashboard tab: counters, server health, activity, worker timings and
//! the newest items, all for the selected period.

use ratatui::crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use moddash_proto::metrics::{
    activity_peak, normalize, time_ago, timing_bar_widths, ServerSummary, TimingBand,
};
use moddash_proto::protocol::{ActivityPoint, Post, Stats, WorkerTiming};
use moddash_sync::SyncHub;

use crate::action::{Action, ComponentId};
use crate::component::{Component, RenderCtx};
use crate::components::{framed, period_key};
use crate::theme::Palette;
use crate::widgets::pane_chrome::{feed_badge, pane_chrome, placeholder};
use crate::widgets::{bar, truncate};

#[derive(Debug, Default)]
pub struct DashboardView;

impl Component for DashboardView {
    fn id(&self) -> ComponentId {
        ComponentId::Dashboard
    }

    fn handle_key(&mut self, key: KeyEvent, _hub: &SyncHub) -> Vec<Action> {
        period_key(key).into_iter().collect()
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderCtx<'_>) {
        let dash = ctx.hub.dashboard();
        let recent_rows = dash.recent().data.as_ref().map_or(1, |r| r.len().max(1)) as u16;
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(6),
                Constraint::Length(recent_rows + 2),
            ])
            .split(area);

        draw_cards(frame, rows[0], ctx);

        let middle = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(rows[1]);

        let p = ctx.palette;
        let activity = dash.activity();
        let block = pane_chrome("Content Activity", None, false, feed_badge(activity, p), p);
        if let Some(inner) = framed(frame, middle[0], block, placeholder(activity), p) {
            draw_activity(frame, inner, activity.data.as_deref().unwrap_or_default(), p);
        }

        let processing = dash.processing();
        let block = pane_chrome("Processing Time", None, false, feed_badge(processing, p), p);
        if let Some(inner) = framed(frame, middle[1], block, placeholder(processing), p) {
            draw_timings(frame, inner, processing.data.as_deref().unwrap_or_default(), p);
        }

        let recent = dash.recent();
        let focused = ctx.focused == Some(self.id());
        let block = pane_chrome("Recent Content", None, focused, feed_badge(recent, p), p);
        if let Some(inner) = framed(frame, rows[2], block, placeholder(recent), p) {
            draw_recent(frame, inner, recent.data.as_deref().unwrap_or_default(), ctx);
        }
    }
}

fn draw_cards(frame: &mut Frame, area: Rect, ctx: &RenderCtx<'_>) {
    let p = ctx.palette;
    let dash = ctx.hub.dashboard();
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 5); 5])
        .split(area);

    let stats_state = dash.stats();
    let stats: Option<Stats> = stats_state.data;
    let cards: [(&str, Option<String>, Option<String>); 4] = [
        (
            "Total Content",
            stats.map(|s| s.total.to_string()),
            None,
        ),
        (
            "Approved",
            stats.map(|s| s.approved.to_string()),
            stats.map(|s| format!("{}% approval rate", s.approval_rate())),
        ),
        (
            "Rejected",
            stats.map(|s| s.rejected.to_string()),
            stats.map(|s| format!("{}% rejection rate", s.rejection_rate())),
        ),
        (
            "Pending Review",
            stats.map(|s| s.pending_review().to_string()),
            stats.map(|s| format!("{} need manual review", s.needs_review)),
        ),
    ];
    for (i, (title, value, sub)) in cards.into_iter().enumerate() {
        let block = pane_chrome(title, None, false, feed_badge(stats_state, p), p);
        if let Some(inner) = framed(frame, cols[i], block, placeholder(stats_state), p) {
            draw_card_body(frame, inner, value.unwrap_or_default(), sub, p);
        }
    }

    let servers = dash.servers();
    let block = pane_chrome("Servers", None, false, feed_badge(servers, p), p);
    if let Some(inner) = framed(frame, cols[4], block, placeholder(servers), p) {
        let summary = servers
            .data
            .as_ref()
            .map(ServerSummary::from_status)
            .unwrap_or_default();
        draw_card_body(
            frame,
            inner,
            summary.ratio_label(),
            Some(format!("{}% online", summary.percent())),
            p,
        );
    }
}

fn draw_card_body(frame: &mut Frame, area: Rect, value: String, sub: Option<String>, p: &Palette) {
    let mut lines = vec![Line::styled(value, p.bold())];
    if let Some(sub) = sub {
        lines.push(Line::styled(sub, p.dim()));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

/// One row per bucket; the newest buckets win when space runs out.
pub fn draw_activity(frame: &mut Frame, area: Rect, points: &[ActivityPoint], p: &Palette) {
    let peak = activity_peak(points);
    let label_w = points.iter().map(|pt| pt.day.len()).max().unwrap_or(0).max(3);
    let budget = (area.width as usize).saturating_sub(label_w + 2) / 4;
    let skip = points.len().saturating_sub(area.height as usize);

    let lines: Vec<Line> = points
        .iter()
        .skip(skip)
        .map(|pt| {
            let mut spans = vec![Span::styled(format!("{:>w$} ", pt.day, w = label_w), p.dim())];
            for (value, color) in [
                (pt.approved, p.ok),
                (pt.rejected, p.err),
                (pt.pending, p.warn),
                (pt.needs_review, p.info),
            ] {
                spans.push(Span::styled(
                    format!("{:<w$}", bar(normalize(value, peak), budget), w = budget),
                    Style::default().fg(color),
                ));
            }
            Line::from(spans)
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

pub fn draw_timings(frame: &mut Frame, area: Rect, timings: &[WorkerTiming], p: &Palette) {
    let widths = timing_bar_widths(timings);
    let label_w = timings.iter().map(|t| t.worker.len()).max().unwrap_or(0);
    let room = (area.width as usize).saturating_sub(label_w + 24);

    let lines: Vec<Line> = timings
        .iter()
        .zip(widths)
        .map(|(t, pct)| {
            let color = match t.band() {
                TimingBand::Fast => p.ok,
                TimingBand::Normal => p.warn,
                TimingBand::Slow => p.err,
            };
            Line::from(vec![
                Span::styled(format!("{:<w$} ", t.worker, w = label_w), p.text()),
                Span::styled(
                    format!("{:<w$}", bar(pct / 100.0, room), w = room),
                    Style::default().fg(color),
                ),
                Span::styled(
                    format!(" {:>5.1}s {:>4} {:>3}%", t.average_time, t.processed, t.approval_rate()),
                    p.dim(),
                ),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn draw_recent(frame: &mut Frame, area: Rect, posts: &[Post], ctx: &RenderCtx<'_>) {
    let p = ctx.palette;
    let title_w = (area.width as usize).saturating_sub(44).max(8);
    let lines: Vec<Line> = posts
        .iter()
        .map(|post| {
            Line::from(vec![
                Span::styled("● ", Style::default().fg(p.status_color(&post.status))),
                Span::styled(
                    format!("{:<w$} ", truncate(&post.title, title_w), w = title_w),
                    p.text(),
                ),
                Span::styled(format!("{:<12} ", truncate(&post.author, 12)), p.dim()),
                Span::styled(
                    format!("{:<10} ", post.status.label()),
                    Style::default()
                        .fg(p.status_color(&post.status))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(time_ago(post.created_at, ctx.now), p.faint()),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}
