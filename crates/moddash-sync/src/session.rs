//! Process-wide operator context: who is signed in and which theme is on.
//!
//! Built once at startup and handed out as `Arc<Session>`.  Reads are
//! lock-and-clone; the only writers are the setters below.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Moderator,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl User {
    /// The operator running the console, named after the OS user.
    pub fn local_operator() -> Self {
        let username = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "operator".to_string());
        Self {
            id: "local".to_string(),
            email: format!("{}@localhost", username),
            username,
            role: Role::Moderator,
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    user: Option<User>,
    theme: Theme,
}

#[derive(Debug, Default)]
pub struct Session {
    state: RwLock<SessionState>,
}

impl Session {
    pub fn new(user: Option<User>, theme: Theme) -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(SessionState { user, theme }),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().user.is_some()
    }

    pub fn theme(&self) -> Theme {
        self.read().theme
    }

    pub fn set_theme(&self, theme: Theme) {
        self.write().theme = theme;
        info!("[session] theme={}", theme.as_str());
    }

    pub fn toggle_theme(&self) -> Theme {
        let mut state = self.write();
        state.theme = state.theme.toggle();
        info!("[session] theme={}", state.theme.as_str());
        state.theme
    }

    pub fn sign_in(&self, user: User) {
        info!("[session] signed in as {}", user.username);
        self.write().user = Some(user);
    }

    pub fn sign_out(&self) {
        if let Some(user) = self.write().user.take() {
            info!("[session] {} signed out", user.username);
        }
    }
}
