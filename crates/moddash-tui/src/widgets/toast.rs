//! Renders the notification bridge in the top-right corner.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use moddash_sync::{NotificationBridge, NotificationEvent, NotificationKind};

use crate::theme::Palette;

fn icon(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Info => "·",
        NotificationKind::Success => "✓",
        NotificationKind::Warning => "!",
        NotificationKind::Error => "✗",
    }
}

/// One-line text for an event: title, then the message if any.
pub fn toast_text(event: &NotificationEvent) -> String {
    match &event.message {
        Some(message) if !message.is_empty() => {
            format!(" {} {}: {} ", icon(event.kind), event.title, message)
        }
        _ => format!(" {} {} ", icon(event.kind), event.title),
    }
}

pub fn draw(frame: &mut Frame, area: Rect, notifications: &NotificationBridge, palette: &Palette) {
    if notifications.is_empty() {
        return;
    }
    let max_width = (area.width / 2).clamp(30, 72).min(area.width);
    let mut y = area.y + 1;

    for note in notifications.visible() {
        if y >= area.y + area.height {
            break;
        }
        let text = super::truncate(&toast_text(&note.event), max_width as usize);
        let w = (text.width() as u16).min(max_width);
        let x = area.x + area.width.saturating_sub(w + 1);
        let toast_area = Rect {
            x,
            y,
            width: w,
            height: 1,
        };
        frame.render_widget(Clear, toast_area);
        let color = palette.notification_color(note.event.kind);
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                text,
                Style::default()
                    .fg(color)
                    .bg(palette.bg)
                    .add_modifier(Modifier::BOLD),
            ))),
            toast_area,
        );
        y += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_text() {
        let bare = NotificationEvent::success("Content Submitted");
        assert_eq!(toast_text(&bare), " ✓ Content Submitted ");

        let full = NotificationEvent::error("Statistics unavailable")
            .with_message("Server returned 502 Bad Gateway");
        assert_eq!(
            toast_text(&full),
            " ✗ Statistics unavailable: Server returned 502 Bad Gateway "
        );
    }
}
