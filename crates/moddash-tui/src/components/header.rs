//! Two-row header: tabs and period on top, operator and theme below.

use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use moddash_proto::protocol::Period;
use moddash_sync::session::Session;
use moddash_sync::View;

use crate::component::RenderCtx;

pub fn draw(frame: &mut Frame, area: Rect, ctx: &RenderCtx<'_>, session: &Session) {
    let p = ctx.palette;
    let active = ctx.hub.active_view();

    let mut top = vec![Span::styled(" moddash ", p.bold().fg(p.accent))];
    for view in View::ALL {
        let style = if Some(view) == active {
            p.highlight()
        } else {
            p.dim()
        };
        top.push(Span::styled(format!(" {} ", view.title()), style));
    }

    if let Some(current) = ctx.hub.period() {
        top.push(Span::raw("   "));
        for (i, period) in Period::ALL.into_iter().enumerate() {
            let style = if period == current {
                p.text().fg(p.accent).add_modifier(Modifier::BOLD)
            } else {
                p.faint()
            };
            top.push(Span::styled(format!("{} {}  ", i + 1, period.label()), style));
        }
    }

    let who = match session.user() {
        Some(user) => format!(" {} ({:?})", user.username, user.role).to_lowercase(),
        None => " signed out".to_string(),
    };
    let second = Line::from(vec![
        Span::styled(who, p.dim()),
        Span::styled(format!("  theme: {}", session.theme().as_str()), p.faint()),
    ]);

    frame.render_widget(Paragraph::new(vec![Line::from(top), second]), area);
}
