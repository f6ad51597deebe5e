//! Colour palettes for the console.  One per session theme.

use ratatui::style::{Color, Modifier, Style};

use moddash_proto::protocol::PostStatus;
use moddash_sync::session::Theme;
use moddash_sync::NotificationKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub bg: Color,
    pub primary: Color,
    pub secondary: Color,
    pub muted: Color,
    pub accent: Color,
    pub separator: Color,
    pub border: Color,
    pub border_focused: Color,
    pub number_hint: Color,
    pub selection_bg: Color,
    pub input_bg: Color,
    pub input_fg: Color,
    pub ok: Color,
    pub warn: Color,
    pub err: Color,
    pub info: Color,
}

pub const DARK: Palette = Palette {
    bg: Color::Rgb(18, 18, 18),
    primary: Color::Rgb(210, 210, 225),
    secondary: Color::Rgb(115, 115, 138),
    muted: Color::Rgb(72, 72, 88),
    accent: Color::Rgb(120, 100, 200),
    separator: Color::Rgb(40, 40, 52),
    border: Color::Rgb(40, 40, 52),
    border_focused: Color::Rgb(120, 100, 200),
    number_hint: Color::Rgb(90, 90, 115),
    selection_bg: Color::Rgb(28, 28, 40),
    input_bg: Color::Rgb(20, 20, 32),
    input_fg: Color::Rgb(255, 200, 80),
    ok: Color::Rgb(80, 200, 120),
    warn: Color::Rgb(255, 184, 80),
    err: Color::Rgb(255, 95, 95),
    info: Color::Rgb(80, 160, 220),
};

pub const LIGHT: Palette = Palette {
    bg: Color::Rgb(246, 246, 250),
    primary: Color::Rgb(30, 30, 42),
    secondary: Color::Rgb(90, 90, 110),
    muted: Color::Rgb(150, 150, 165),
    accent: Color::Rgb(90, 70, 180),
    separator: Color::Rgb(215, 215, 225),
    border: Color::Rgb(200, 200, 212),
    border_focused: Color::Rgb(90, 70, 180),
    number_hint: Color::Rgb(140, 140, 160),
    selection_bg: Color::Rgb(228, 228, 240),
    input_bg: Color::Rgb(236, 236, 246),
    input_fg: Color::Rgb(150, 90, 0),
    ok: Color::Rgb(30, 140, 70),
    warn: Color::Rgb(200, 120, 0),
    err: Color::Rgb(200, 40, 40),
    info: Color::Rgb(30, 110, 190),
};

pub fn palette(theme: Theme) -> &'static Palette {
    match theme {
        Theme::Dark => &DARK,
        Theme::Light => &LIGHT,
    }
}

impl Palette {
    pub fn text(&self) -> Style {
        Style::default().fg(self.primary)
    }

    pub fn dim(&self) -> Style {
        Style::default().fg(self.secondary)
    }

    pub fn faint(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn bold(&self) -> Style {
        self.text().add_modifier(Modifier::BOLD)
    }

    pub fn highlight(&self) -> Style {
        Style::default()
            .bg(self.selection_bg)
            .fg(self.primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn input(&self) -> Style {
        Style::default().fg(self.input_fg).bg(self.input_bg)
    }

    pub fn status_color(&self, status: &PostStatus) -> Color {
        match status {
            PostStatus::Approved => self.ok,
            PostStatus::Rejected => self.err,
            PostStatus::Pending | PostStatus::Processing => self.warn,
            PostStatus::NeedsReview => self.info,
            PostStatus::Unknown => self.muted,
        }
    }

    pub fn notification_color(&self, kind: NotificationKind) -> Color {
        match kind {
            NotificationKind::Success => self.ok,
            NotificationKind::Error => self.err,
            NotificationKind::Warning => self.warn,
            NotificationKind::Info => self.info,
        }
    }
}
