//! Everything a key press can ask the app to do.

use moddash_proto::protocol::Period;
use moddash_sync::View;

/// Focusable screen regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    Dashboard,
    Content,
    Analytics,
    SubmissionForm,
    HelpOverlay,
}

impl From<View> for ComponentId {
    fn from(view: View) -> Self {
        match view {
            View::Dashboard => ComponentId::Dashboard,
            View::Content => ComponentId::Content,
            View::Analytics => ComponentId::Analytics,
        }
    }
}

/// Text fields of the submission form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Content,
    Author,
    Category,
    Server,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::Title,
        FormField::Content,
        FormField::Author,
        FormField::Category,
        FormField::Server,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Content => "Content",
            FormField::Author => "Author",
            FormField::Category => "Category",
            FormField::Server => "Server",
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, FormField::Title | FormField::Content | FormField::Author)
    }

    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        let idx = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // ── Views ────────────────────────────────────────────────────────────────
    ShowView(View),
    NextView,
    SetPeriod(Period),
    Refresh,

    // ── Content list ─────────────────────────────────────────────────────────
    CycleFilter,
    NextPage,
    PrevPage,

    // ── Submission ───────────────────────────────────────────────────────────
    OpenForm,
    CloseForm,
    EditField(FormField, String),
    CycleCategory,
    CycleServer,
    SubmitForm,

    // ── UI ───────────────────────────────────────────────────────────────────
    ToggleTheme,
    DismissNotifications,
    ToggleHelp,
    Quit,
}
