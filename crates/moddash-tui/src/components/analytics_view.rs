//! Analytics tab.

use ratatui::crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use moddash_proto::metrics::CategoryShare;
use moddash_sync::SyncHub;

use crate::action::{Action, ComponentId};
use crate::component::{Component, RenderCtx};
use crate::components::dashboard_view::{draw_activity, draw_timings};
use crate::components::{framed, period_key};
use crate::theme::Palette;
use crate::widgets::bar;
use crate::widgets::pane_chrome::{feed_badge, pane_chrome, placeholder};

#[derive(Debug, Default)]
pub struct AnalyticsView;

impl Component for AnalyticsView {
    fn id(&self) -> ComponentId {
        ComponentId::Analytics
    }

    fn handle_key(&mut self, key: KeyEvent, _hub: &SyncHub) -> Vec<Action> {
        period_key(key).into_iter().collect()
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderCtx<'_>) {
        let p = ctx.palette;
        let analytics = ctx.hub.analytics();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(6)])
            .split(area);
        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(rows[0]);
        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);

        let insights = analytics.insights();
        let block = pane_chrome("Insights", None, false, feed_badge(insights, p), p);
        if let Some(inner) = framed(frame, top[0], block, placeholder(insights), p) {
            if let Some(i) = insights.data {
                let lines = vec![
                    kv("Avg. processing", i.avg_processing_label(), p),
                    kv("Approval rate", i.approval_label(), p),
                    kv("Content volume", i.content_volume.to_string(), p),
                ];
                frame.render_widget(Paragraph::new(lines), inner);
            }
        }

        let categories = analytics.categories();
        let focused = ctx.focused == Some(self.id());
        let block = pane_chrome("Content Categories", None, focused, feed_badge(categories, p), p);
        let empty = categories
            .data
            .as_ref()
            .is_some_and(|c| c.is_empty())
            .then(|| "No categorized content".to_string());
        if let Some(inner) = framed(frame, top[1], block, placeholder(categories).or(empty), p) {
            draw_shares(frame, inner, &analytics.category_shares(), p);
        }

        let activity = analytics.activity();
        let block = pane_chrome("Content Activity", None, false, feed_badge(activity, p), p);
        if let Some(inner) = framed(frame, bottom[0], block, placeholder(activity), p) {
            draw_activity(frame, inner, activity.data.as_deref().unwrap_or_default(), p);
        }

        let workers = analytics.workers();
        let block = pane_chrome("Moderator Performance", None, false, feed_badge(workers, p), p);
        if let Some(inner) = framed(frame, bottom[1], block, placeholder(workers), p) {
            draw_timings(frame, inner, workers.data.as_deref().unwrap_or_default(), p);
        }
    }
}

fn kv(key: &str, value: String, p: &Palette) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<16}", key), p.dim()),
        Span::styled(value, p.bold()),
    ])
}

fn draw_shares(frame: &mut Frame, area: Rect, shares: &[CategoryShare], p: &Palette) {
    let colors = [p.accent, p.info, p.ok, p.warn, p.err, p.secondary];
    let label_w = shares.iter().map(|s| s.name.len()).max().unwrap_or(0);
    let room = (area.width as usize).saturating_sub(label_w + 12);
    let lines: Vec<Line> = shares
        .iter()
        .enumerate()
        .map(|(i, share)| {
            Line::from(vec![
                Span::styled(format!("{:<w$} ", share.name, w = label_w), p.text()),
                Span::styled(
                    format!("{:<w$}", bar(f64::from(share.percent) / 100.0, room), w = room),
                    Style::default().fg(colors[i % colors.len()]),
                ),
                Span::styled(format!(" {:>3}% {:>4}", share.percent, share.value), p.dim()),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}
