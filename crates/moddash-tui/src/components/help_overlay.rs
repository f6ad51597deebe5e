//! Centered popup with the key reference.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use moddash_sync::SyncHub;

use crate::action::{Action, ComponentId};
use crate::component::{Component, RenderCtx};
use crate::components::centered_rect;
use crate::theme::Palette;

#[derive(Debug, Default)]
pub struct HelpOverlay {
    pub visible: bool,
}

impl Component for HelpOverlay {
    fn id(&self) -> ComponentId {
        ComponentId::HelpOverlay
    }

    fn handle_key(&mut self, key: KeyEvent, _hub: &SyncHub) -> Vec<Action> {
        match key.code {
            KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::Esc => vec![Action::ToggleHelp],
            _ => vec![],
        }
    }

    fn on_action(&mut self, action: &Action, _hub: &SyncHub) {
        if *action == Action::ToggleHelp {
            self.visible = !self.visible;
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderCtx<'_>) {
        if !self.visible {
            return;
        }
        let p = ctx.palette;
        let popup = centered_rect(60, 20, area);
        let lines = vec![
            Line::styled(" keyboard shortcuts", p.bold()),
            Line::from(""),
            help_row("tab / shift-tab", "next / previous tab", p),
            help_row("1 2 3 4", "period: day / week / month / year", p),
            help_row("r", "refresh the current tab", p),
            help_row("f", "cycle the status filter (Content)", p),
            help_row("← / →", "previous / next page (Content)", p),
            help_row("n", "submit new content", p),
            help_row("t", "toggle light / dark theme", p),
            help_row("x", "dismiss notifications", p),
            help_row("?", "toggle this help", p),
            help_row("q / ctrl-c", "quit", p),
            Line::from(""),
            Line::styled(" press ? or esc to close", p.faint()),
        ];
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(p.border_focused))
                    .style(Style::default().bg(p.bg)),
            ),
            popup,
        );
    }
}

fn help_row(key: &'static str, desc: &'static str, p: &Palette) -> Line<'static> {
    Line::from(vec![
        Span::raw(" "),
        Span::styled(format!("{:<18}", key), p.bold()),
        Span::styled(desc, p.dim()),
    ])
}
