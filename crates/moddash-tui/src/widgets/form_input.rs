//! Single-line text field over tui-input.

use ratatui::crossterm::event::{Event, KeyEvent};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::theme::Palette;

#[derive(Debug, Default)]
pub struct FormInput {
    input: Input,
    placeholder: String,
}

impl FormInput {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            input: Input::default(),
            placeholder: placeholder.into(),
        }
    }

    pub fn text(&self) -> &str {
        self.input.value()
    }

    /// Follow an external value (e.g. a form reset) without losing the
    /// cursor when nothing changed.
    pub fn sync(&mut self, value: &str) {
        if self.input.value() != value {
            self.input = Input::new(value.to_string());
        }
    }

    /// Feed a key.  Returns the new value when it changed.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<String> {
        let before = self.input.value().to_string();
        self.input.handle_event(&Event::Key(key));
        let after = self.input.value();
        (after != before).then(|| after.to_string())
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect, focused: bool, palette: &Palette) {
        let width = area.width.saturating_sub(1) as usize;
        let scroll = self.input.visual_scroll(width);
        let value = self.input.value();
        let span = if value.is_empty() {
            Span::styled(self.placeholder.as_str(), palette.faint())
        } else {
            let visible: String = value.chars().skip(scroll).collect();
            Span::styled(visible, palette.text())
        };
        let style = if focused { palette.input() } else { palette.dim() };
        frame.render_widget(Paragraph::new(Line::from(span)).style(style), area);

        if focused && area.width > 0 {
            let cursor = self.input.visual_cursor().saturating_sub(scroll) as u16;
            let x = (area.x + cursor).min(area.x + area.width - 1);
            frame.set_cursor_position((x, area.y));
        }
    }
}

#[cfg(test)]
mod tests {
    use ratatui::crossterm::event::{KeyCode, KeyModifiers};

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_typing_reports_changes() {
        let mut field = FormInput::new("Title");
        assert_eq!(field.handle_key(key(KeyCode::Char('h'))), Some("h".into()));
        assert_eq!(field.handle_key(key(KeyCode::Char('i'))), Some("hi".into()));
        assert_eq!(field.handle_key(key(KeyCode::Left)), None);
        assert_eq!(field.handle_key(key(KeyCode::Backspace)), Some("i".into()));
    }

    #[test]
    fn test_sync_replaces_value() {
        let mut field = FormInput::new("Author");
        field.handle_key(key(KeyCode::Char('x')));
        field.sync("");
        assert_eq!(field.text(), "");
    }
}
