pub mod analytics_view;
pub mod content_view;
pub mod dashboard_view;
pub mod header;
pub mod help_overlay;
pub mod submission_form;

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph};
use ratatui::Frame;

use moddash_proto::protocol::Period;

use crate::action::Action;
use crate::theme::Palette;

/// `1`-`4` pick day/week/month/year.
pub fn period_key(key: KeyEvent) -> Option<Action> {
    let period = match key.code {
        KeyCode::Char('1') => Period::Day,
        KeyCode::Char('2') => Period::Week,
        KeyCode::Char('3') => Period::Month,
        KeyCode::Char('4') => Period::Year,
        _ => return None,
    };
    Some(Action::SetPeriod(period))
}

/// Draw `block` and, when `message` is set, a dim line inside it.
/// Returns the inner area for the caller to fill otherwise.
pub fn framed(
    frame: &mut Frame,
    area: Rect,
    block: Block<'_>,
    message: Option<String>,
    palette: &Palette,
) -> Option<Rect> {
    let inner = block.inner(area);
    frame.render_widget(block, area);
    match message {
        Some(text) => {
            frame.render_widget(Paragraph::new(Line::styled(text, palette.dim())), inner);
            None
        }
        None => Some(inner),
    }
}

pub fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vert[1])[1]
}
