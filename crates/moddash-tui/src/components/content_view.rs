//! Content tab: the status-filtered item list, one page at a time.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table},
    Frame,
};

use moddash_proto::metrics::time_ago;
use moddash_proto::protocol::{Filter, Stats};
use moddash_sync::content_list::ContentList;
use moddash_sync::SyncHub;

use crate::action::{Action, ComponentId};
use crate::component::{Component, RenderCtx};
use crate::components::framed;
use crate::theme::Palette;
use crate::widgets::pane_chrome::{feed_badge, pane_chrome, placeholder};
use crate::widgets::truncate;

#[derive(Debug, Default)]
pub struct ContentView;

impl Component for ContentView {
    fn id(&self) -> ComponentId {
        ComponentId::Content
    }

    fn handle_key(&mut self, key: KeyEvent, _hub: &SyncHub) -> Vec<Action> {
        match key.code {
            KeyCode::Char('f') => vec![Action::CycleFilter],
            KeyCode::Right | KeyCode::Char('l') => vec![Action::NextPage],
            KeyCode::Left | KeyCode::Char('h') => vec![Action::PrevPage],
            _ => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderCtx<'_>) {
        let p = ctx.palette;
        let list = ctx.hub.list();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);

        frame.render_widget(
            Paragraph::new(filter_chips(list.filter(), list.stats(), p)),
            rows[0],
        );

        let focused = ctx.focused == Some(self.id());
        let block = pane_chrome("Content", None, focused, feed_badge(list.state(), p), p);
        let message = placeholder(list.state()).or_else(|| {
            list.items()
                .is_empty()
                .then(|| format!("No {} content", list.filter().label().to_lowercase()))
        });
        if let Some(inner) = framed(frame, rows[1], block, message, p) {
            draw_table(frame, inner, list, ctx);
        }

        frame.render_widget(Paragraph::new(footer(list, p)), rows[2]);
    }
}

/// `All (12)  Approved (7) …` with the active filter highlighted.
pub fn filter_chips(active: Filter, stats: Option<&Stats>, p: &Palette) -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    for filter in Filter::ALL {
        let text = match stats {
            Some(stats) => format!(" {} ({}) ", filter.label(), filter.count_in(stats)),
            None => format!(" {} ", filter.label()),
        };
        let style = if filter == active {
            p.highlight().fg(p.accent)
        } else {
            p.dim()
        };
        spans.push(Span::styled(text, style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn footer(list: &ContentList, p: &Palette) -> Line<'static> {
    let pages = list.pagination();
    let mut spans = Vec::new();
    if list.should_paginate() {
        spans.push(Span::styled(
            format!(" page {}/{} ", pages.current_page, pages.total_pages()),
            p.bold(),
        ));
    }
    spans.push(Span::styled(
        format!(" {} items", pages.total_items),
        p.dim(),
    ));
    if list.is_showing_stale_filter() {
        spans.push(Span::styled(
            format!("  loading {}…", list.filter().label()),
            Style::default().fg(p.warn),
        ));
    }
    Line::from(spans)
}

fn draw_table(frame: &mut Frame, area: Rect, list: &ContentList, ctx: &RenderCtx<'_>) {
    let p = ctx.palette;
    let title_w = (area.width as usize).saturating_sub(6 + 14 + 9 + 13 + 6 + 16 + 6).max(10);

    let header = Row::new(["ID", "Title", "Author", "Server", "Status", "Score", "Created"])
        .style(p.faint().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = list
        .current_page_items()
        .iter()
        .map(|post| {
            let score = post
                .toxicity_score
                .map(|s| format!("{:.2}", s))
                .unwrap_or_else(|| "-".to_string());
            Row::new(vec![
                Cell::from(truncate(&post.id, 6)).style(p.faint()),
                Cell::from(truncate(&post.title, title_w)).style(p.text()),
                Cell::from(truncate(&post.author, 14)).style(p.dim()),
                Cell::from(post.server.clone()).style(p.dim()),
                Cell::from(post.status.label()).style(
                    Style::default()
                        .fg(p.status_color(&post.status))
                        .add_modifier(Modifier::BOLD),
                ),
                Cell::from(score).style(p.dim()),
                Cell::from(time_ago(post.created_at, ctx.now)).style(p.faint()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(6),
        Constraint::Min(10),
        Constraint::Length(14),
        Constraint::Length(9),
        Constraint::Length(13),
        Constraint::Length(6),
        Constraint::Length(16),
    ];
    frame.render_widget(Table::new(rows, widths).header(header), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::DARK;

    #[test]
    fn test_chips_show_counts_when_known() {
        let stats = Stats {
            total: 12,
            approved: 7,
            rejected: 2,
            pending: 1,
            processing: 1,
            needs_review: 1,
        };
        let line = filter_chips(Filter::Approved, Some(&stats), &DARK);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(text.contains("All (12)"));
        assert!(text.contains("Needs review (1)"));

        let bare = filter_chips(Filter::All, None, &DARK);
        let text: String = bare.spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(text.contains(" Pending "));
        assert!(!text.contains('('));
    }
}
