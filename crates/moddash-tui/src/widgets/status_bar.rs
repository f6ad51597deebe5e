//! Bottom line: input mode, connection hint and key bindings.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use moddash_sync::View;

use crate::theme::Palette;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Form,
}

impl InputMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Form => "FORM",
        }
    }
}

pub fn keys_for(mode: InputMode, view: Option<View>) -> &'static str {
    match mode {
        InputMode::Form => {
            " Tab/↑↓ field  ←→ category/server  Enter submit  Esc close"
        }
        InputMode::Normal => match view {
            Some(View::Content) => {
                " Tab view  f filter  ←→ page  n new  r refresh  t theme  x dismiss  ? help  q quit"
            }
            _ => " Tab view  1-4 period  n new  r refresh  t theme  x dismiss  ? help  q quit",
        },
    }
}

pub fn draw_separator(frame: &mut Frame, area: Rect, palette: &Palette) {
    let line = Line::from(Span::styled(
        "─".repeat(area.width as usize),
        Style::default().fg(palette.separator),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

/// `reachable` is whether the last status poll succeeded.
pub fn draw_keys_bar(
    frame: &mut Frame,
    area: Rect,
    mode: InputMode,
    view: Option<View>,
    reachable: Option<bool>,
    palette: &Palette,
) {
    let mode_color = match mode {
        InputMode::Normal => palette.secondary,
        InputMode::Form => palette.input_fg,
    };
    let (bulb, bulb_color) = match reachable {
        Some(true) => ("●", palette.ok),
        Some(false) => ("○", palette.err),
        None => ("○", palette.muted),
    };
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", mode.label()),
            Style::default().fg(mode_color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(bulb, Style::default().fg(bulb_color)),
        Span::raw(" "),
        Span::styled(keys_for(mode, view), palette.faint()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
