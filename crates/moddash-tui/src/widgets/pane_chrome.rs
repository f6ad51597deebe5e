//! Bordered pane with focus styling and a status badge.

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders},
};

use moddash_sync::{FeedState, FeedStatus};

use crate::theme::Palette;

/// Short label in the top-right of a pane header.
pub struct Badge<'a> {
    pub text: &'a str,
    pub color: Color,
}

/// Badge for a feed: loading spinner text while fetching, `STALE` when a
/// refresh failed but older data is still shown, `ERR` when there is none.
pub fn feed_badge<T>(state: &FeedState<T>, palette: &Palette) -> Option<Badge<'static>> {
    match state.status {
        FeedStatus::Loading => Some(Badge {
            text: "…",
            color: palette.warn,
        }),
        FeedStatus::Error if state.has_data() => Some(Badge {
            text: "STALE",
            color: palette.warn,
        }),
        FeedStatus::Error => Some(Badge {
            text: "ERR",
            color: palette.err,
        }),
        FeedStatus::Idle | FeedStatus::Ready => None,
    }
}

pub fn pane_chrome<'a>(
    title: &'a str,
    number_key: Option<char>,
    focused: bool,
    badge: Option<Badge<'a>>,
    palette: &Palette,
) -> Block<'a> {
    let border_style = if focused {
        Style::default().fg(palette.border_focused)
    } else {
        Style::default().fg(palette.border)
    };
    let title_style = if focused {
        palette.bold()
    } else {
        palette.dim()
    };

    let mut title_spans = Vec::new();
    if let Some(key) = number_key {
        title_spans.push(Span::styled(
            format!("[{}] ", key),
            Style::default().fg(palette.number_hint),
        ));
    }
    title_spans.push(Span::styled(title, title_style));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Line::from(title_spans));

    match badge {
        Some(b) => block.title_top(
            Line::from(Span::styled(
                format!(" {} ", b.text),
                Style::default().fg(b.color).add_modifier(Modifier::BOLD),
            ))
            .right_aligned(),
        ),
        None => block,
    }
}

/// Body text for a pane that has nothing to draw yet, if any.
pub fn placeholder<T>(state: &FeedState<T>) -> Option<String> {
    if state.has_data() {
        return None;
    }
    match state.status {
        FeedStatus::Loading => Some("Loading…".to_string()),
        FeedStatus::Error => Some(
            state
                .error_message
                .clone()
                .unwrap_or_else(|| "Unavailable".to_string()),
        ),
        FeedStatus::Idle | FeedStatus::Ready => Some("No data".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::DARK;

    #[test]
    fn test_failed_refresh_with_data_is_stale_not_error() {
        let mut state: FeedState<u32> = FeedState::default();
        state.status = FeedStatus::Error;
        state.error_message = Some("Server returned 500".into());
        assert_eq!(feed_badge(&state, &DARK).map(|b| b.text), Some("ERR"));
        assert_eq!(placeholder(&state).as_deref(), Some("Server returned 500"));

        state.data = Some(3);
        assert_eq!(feed_badge(&state, &DARK).map(|b| b.text), Some("STALE"));
        assert_eq!(placeholder(&state), None);
    }

    #[test]
    fn test_ready_feed_has_no_badge() {
        let mut state: FeedState<u32> = FeedState::default();
        state.status = FeedStatus::Ready;
        state.data = Some(1);
        assert!(feed_badge(&state, &DARK).is_none());
    }
}
