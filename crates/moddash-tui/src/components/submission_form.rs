//! Popup form for new content.  Field values live in the hub's
//! `Submission`; the inputs here only hold cursor state.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use moddash_sync::submission::SubmissionForm;
use moddash_sync::SyncHub;

use crate::action::{Action, ComponentId, FormField};
use crate::component::{Component, RenderCtx};
use crate::components::centered_rect;
use crate::widgets::form_input::FormInput;

pub struct SubmissionPanel {
    pub visible: bool,
    focus: FormField,
    title: FormInput,
    content: FormInput,
    author: FormInput,
}

impl SubmissionPanel {
    pub fn new() -> Self {
        Self {
            visible: false,
            focus: FormField::Title,
            title: FormInput::new("What is this about?"),
            content: FormInput::new("Text to moderate"),
            author: FormInput::new("Your name"),
        }
    }

    pub fn focus(&self) -> FormField {
        self.focus
    }

    fn input_mut(&mut self, field: FormField) -> Option<&mut FormInput> {
        match field {
            FormField::Title => Some(&mut self.title),
            FormField::Content => Some(&mut self.content),
            FormField::Author => Some(&mut self.author),
            FormField::Category | FormField::Server => None,
        }
    }

    fn sync(&mut self, form: &SubmissionForm) {
        self.title.sync(&form.title);
        self.content.sync(&form.content);
        self.author.sync(&form.author);
    }
}

impl Default for SubmissionPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for SubmissionPanel {
    fn id(&self) -> ComponentId {
        ComponentId::SubmissionForm
    }

    fn handle_key(&mut self, key: KeyEvent, _hub: &SyncHub) -> Vec<Action> {
        match key.code {
            KeyCode::Esc => return vec![Action::CloseForm],
            KeyCode::Enter => return vec![Action::SubmitForm],
            KeyCode::Tab | KeyCode::Down => {
                self.focus = self.focus.next();
                return vec![];
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = self.focus.prev();
                return vec![];
            }
            _ => {}
        }
        let field = self.focus;
        match field {
            FormField::Category => match key.code {
                KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') => vec![Action::CycleCategory],
                _ => vec![],
            },
            FormField::Server => match key.code {
                KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') => vec![Action::CycleServer],
                _ => vec![],
            },
            _ => self
                .input_mut(field)
                .and_then(|input| input.handle_key(key))
                .map(|value| vec![Action::EditField(field, value)])
                .unwrap_or_default(),
        }
    }

    fn on_action(&mut self, action: &Action, hub: &SyncHub) {
        match action {
            Action::OpenForm => {
                self.visible = true;
                self.focus = FormField::Title;
                self.sync(&hub.submission().form);
            }
            Action::CloseForm => self.visible = false,
            _ => {}
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, ctx: &RenderCtx<'_>) {
        if !self.visible {
            return;
        }
        let p = ctx.palette;
        let submission = ctx.hub.submission();
        self.sync(&submission.form);

        let popup = centered_rect(60, 13, area);
        frame.render_widget(Clear, popup);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(p.border_focused))
            .style(Style::default().bg(p.bg))
            .title(Line::styled(" Submit Content ", p.bold()));
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        for (i, field) in FormField::ALL.into_iter().enumerate() {
            let focused = field == self.focus;
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(11), Constraint::Min(1)])
                .split(rows[i]);
            let label_style = if focused { p.bold() } else { p.dim() };
            let marker = if field.is_text() { "*" } else { " " };
            frame.render_widget(
                Paragraph::new(Line::styled(
                    format!(" {}{} ", field.label(), marker),
                    label_style,
                )),
                cols[0],
            );
            match field {
                FormField::Title => self.title.draw(frame, cols[1], focused, p),
                FormField::Content => self.content.draw(frame, cols[1], focused, p),
                FormField::Author => self.author.draw(frame, cols[1], focused, p),
                FormField::Category | FormField::Server => {
                    let value = match field {
                        FormField::Category => submission.form.category.label().to_string(),
                        _ => submission.form.server.clone(),
                    };
                    let style = if focused { p.input() } else { p.text() };
                    frame.render_widget(
                        Paragraph::new(Line::from(vec![
                            Span::styled(format!("‹ {} ›", value), style),
                        ])),
                        cols[1],
                    );
                }
            }
        }

        let status = if submission.is_submitting() {
            Line::styled(" Submitting…", Style::default().fg(p.warn))
        } else if let Some(err) = submission.inline_error() {
            Line::styled(format!(" {}", err), Style::default().fg(p.err))
        } else {
            Line::styled(" * required", p.faint())
        };
        frame.render_widget(Paragraph::new(status), rows[6]);
    }
}
