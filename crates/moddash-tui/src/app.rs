//! App: owns the hub and the components, runs the event loop.
//!
//! Three inputs are multiplexed: sync events (timer ticks and finished
//! requests), terminal events from a blocking reader task, and a UI tick
//! that expires notifications.  State only changes on this task.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::Block,
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use moddash_sync::session::Session;
use moddash_sync::{FeedStatus, SyncEvent, SyncHub, View};

use crate::action::{Action, ComponentId, FormField};
use crate::component::{Component, RenderCtx};
use crate::components::{
    analytics_view::AnalyticsView, content_view::ContentView, dashboard_view::DashboardView,
    header, help_overlay::HelpOverlay, submission_form::SubmissionPanel,
};
use crate::theme::palette;
use crate::widgets::status_bar::{self, InputMode};
use crate::widgets::toast;

/// Used for the server selector until the first status poll lands.
const FALLBACK_SERVERS: [&str; 3] = ["server1", "server2", "server3"];

const MAX_DRAIN: usize = 64;

pub struct App {
    hub: SyncHub,
    session: Arc<Session>,
    dashboard: DashboardView,
    content: ContentView,
    analytics: AnalyticsView,
    form: SubmissionPanel,
    help: HelpOverlay,
    mode: InputMode,
    awaiting_submit: bool,
    should_quit: bool,
}

impl App {
    pub fn new(hub: SyncHub, session: Arc<Session>) -> Self {
        Self {
            hub,
            session,
            dashboard: DashboardView,
            content: ContentView,
            analytics: AnalyticsView,
            form: SubmissionPanel::new(),
            help: HelpOverlay::default(),
            mode: InputMode::Normal,
            awaiting_submit: false,
            should_quit: false,
        }
    }

    pub async fn run(mut self, mut sync_rx: mpsc::Receiver<SyncEvent>) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        let result = self.event_loop(&mut terminal, &mut sync_rx).await;

        self.hub.shutdown();
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        sync_rx: &mut mpsc::Receiver<SyncEvent>,
    ) -> anyhow::Result<()> {
        let (key_tx, mut key_rx) = mpsc::channel::<Event>(256);
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if key_tx.blocking_send(ev).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("terminal event read failed: {}", e);
                    break;
                }
            }
        });

        let mut ui_tick = tokio::time::interval(Duration::from_millis(250));
        ui_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        self.hub.show(View::Dashboard);
        info!("console started");

        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }
            needs_redraw = false;

            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(event) = sync_rx.recv() => {
                    let mut changed = self.on_sync(event);
                    let mut drained = 0;
                    while drained < MAX_DRAIN {
                        let Ok(next) = sync_rx.try_recv() else { break };
                        changed |= self.on_sync(next);
                        drained += 1;
                    }
                    needs_redraw = changed;
                }
                Some(ev) = key_rx.recv() => {
                    needs_redraw = self.on_terminal_event(ev);
                }
                _ = ui_tick.tick() => {
                    let before = self.hub.notifications().len();
                    self.hub.tick_notifications();
                    needs_redraw = before != self.hub.notifications().len();
                }
            }
        }
        info!("console quitting");
        Ok(())
    }

    fn on_sync(&mut self, event: SyncEvent) -> bool {
        let changed = self.hub.handle(event);
        if self.awaiting_submit && !self.hub.submission().is_submitting() {
            self.awaiting_submit = false;
            if self.hub.submission().inline_error().is_none() {
                self.dispatch(Action::CloseForm);
            }
        }
        changed
    }

    fn on_terminal_event(&mut self, ev: Event) -> bool {
        match ev {
            Event::Key(key) => {
                for action in self.handle_key(key) {
                    self.dispatch(action);
                }
                true
            }
            Event::Resize(..) => true,
            _ => false,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return vec![Action::Quit];
        }
        if self.help.visible {
            let actions = self.help.handle_key(key, &self.hub);
            if actions.is_empty() {
                return vec![Action::ToggleHelp];
            }
            return actions;
        }
        if self.mode == InputMode::Form {
            return self.form.handle_key(key, &self.hub);
        }

        match key.code {
            KeyCode::Char('q') => return vec![Action::Quit],
            KeyCode::Char('?') => return vec![Action::ToggleHelp],
            KeyCode::Tab => return vec![Action::NextView],
            KeyCode::BackTab => return vec![Action::ShowView(self.previous_view())],
            KeyCode::Char('t') => return vec![Action::ToggleTheme],
            KeyCode::Char('x') => return vec![Action::DismissNotifications],
            KeyCode::Char('r') => return vec![Action::Refresh],
            KeyCode::Char('n') => return vec![Action::OpenForm],
            _ => {}
        }

        match self.hub.active_view() {
            Some(View::Dashboard) => self.dashboard.handle_key(key, &self.hub),
            Some(View::Content) => self.content.handle_key(key, &self.hub),
            Some(View::Analytics) => self.analytics.handle_key(key, &self.hub),
            None => vec![],
        }
    }

    fn previous_view(&self) -> View {
        match self.hub.active_view().unwrap_or_default() {
            View::Dashboard => View::Analytics,
            View::Content => View::Dashboard,
            View::Analytics => View::Content,
        }
    }

    fn server_names(&self) -> Vec<String> {
        match self.hub.dashboard().servers().data.as_ref() {
            Some(map) if !map.is_empty() => map.keys().cloned().collect(),
            _ => FALLBACK_SERVERS.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn dispatch(&mut self, action: Action) {
        debug!("dispatch {:?}", action);
        match action {
            Action::ShowView(view) => self.hub.show(view),
            Action::NextView => {
                let next = self.hub.active_view().unwrap_or_default().next();
                self.hub.show(next);
            }
            Action::SetPeriod(period) => self.hub.set_period(period),
            Action::Refresh => self.hub.refresh(),
            Action::CycleFilter => self.hub.cycle_filter(),
            Action::NextPage => {
                self.hub.next_page();
            }
            Action::PrevPage => {
                self.hub.prev_page();
            }
            Action::OpenForm => {
                self.form.on_action(&Action::OpenForm, &self.hub);
                self.mode = InputMode::Form;
            }
            Action::CloseForm => {
                self.form.on_action(&Action::CloseForm, &self.hub);
                self.mode = InputMode::Normal;
            }
            Action::EditField(field, value) => {
                let form = &mut self.hub.submission_mut().form;
                match field {
                    FormField::Title => form.title = value,
                    FormField::Content => form.content = value,
                    FormField::Author => form.author = value,
                    FormField::Category | FormField::Server => {}
                }
            }
            Action::CycleCategory => {
                let form = &mut self.hub.submission_mut().form;
                form.category = form.category.next();
            }
            Action::CycleServer => {
                let servers = self.server_names();
                let form = &mut self.hub.submission_mut().form;
                let idx = servers.iter().position(|s| *s == form.server);
                let next = idx.map_or(0, |i| (i + 1) % servers.len());
                if let Some(server) = servers.get(next) {
                    form.server = server.clone();
                }
            }
            Action::SubmitForm => match self.hub.submit() {
                Ok(()) => self.awaiting_submit = true,
                Err(e) => debug!("submission not sent: {}", e),
            },
            Action::ToggleTheme => {
                let theme = self.session.toggle_theme();
                info!("theme -> {}", theme.as_str());
            }
            Action::DismissNotifications => self.hub.notifications_mut().dismiss_all(),
            Action::ToggleHelp => self.help.on_action(&Action::ToggleHelp, &self.hub),
            Action::Quit => self.should_quit = true,
        }
    }

    fn focused(&self) -> Option<ComponentId> {
        if self.help.visible {
            Some(ComponentId::HelpOverlay)
        } else if self.form.visible {
            Some(ComponentId::SubmissionForm)
        } else {
            self.hub.active_view().map(ComponentId::from)
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let theme = self.session.theme();
        let p = palette(theme);
        let area = frame.area();
        frame.render_widget(Block::default().style(Style::default().bg(p.bg)), area);

        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        let ctx = RenderCtx {
            hub: &self.hub,
            palette: p,
            now: chrono::Utc::now(),
            focused: self.focused(),
        };

        header::draw(frame, outer[0], &ctx, &self.session);
        status_bar::draw_separator(frame, outer[1], p);

        match self.hub.active_view() {
            Some(View::Dashboard) => self.dashboard.draw(frame, outer[2], &ctx),
            Some(View::Content) => self.content.draw(frame, outer[2], &ctx),
            Some(View::Analytics) => self.analytics.draw(frame, outer[2], &ctx),
            None => {}
        }

        let reachable = match self.hub.dashboard().servers().status {
            FeedStatus::Ready => Some(true),
            FeedStatus::Error => Some(false),
            FeedStatus::Idle | FeedStatus::Loading => None,
        };
        status_bar::draw_keys_bar(
            frame,
            outer[3],
            self.mode,
            self.hub.active_view(),
            reachable,
            p,
        );

        self.form.draw(frame, area, &ctx);
        self.help.draw(frame, area, &ctx);
        toast::draw(frame, area, self.hub.notifications(), p);
    }
}
