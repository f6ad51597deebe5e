//! The interface every screen region implements.
//!
//! Components read the hub but never mutate it; they return `Action`s and
//! the app applies them.

use chrono::{DateTime, Utc};
use ratatui::crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

use moddash_sync::SyncHub;

use crate::action::{Action, ComponentId};
use crate::theme::Palette;

/// Read-only view of the world for one frame.
pub struct RenderCtx<'a> {
    pub hub: &'a SyncHub,
    pub palette: &'a Palette,
    pub now: DateTime<Utc>,
    /// The component that receives keys this frame.
    pub focused: Option<ComponentId>,
}

pub trait Component {
    fn id(&self) -> ComponentId;

    /// Keys this component understands while it has focus.
    fn handle_key(&mut self, key: KeyEvent, hub: &SyncHub) -> Vec<Action>;

    fn on_action(&mut self, _action: &Action, _hub: &SyncHub) {}

    fn draw(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderCtx<'_>);
}
