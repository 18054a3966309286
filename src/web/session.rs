// src/web/session.rs
use super::types::{Message, MessageClass};
use rocket::http::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const SESSION_COOKIE: &str = "scorer_session";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    #[default]
    Login,
    Signup,
    SetupProfile,
    ApplyForRoles,
}

impl Page {
    pub fn requires_login(self) -> bool {
        matches!(self, Page::SetupProfile | Page::ApplyForRoles)
    }
}

/// Per-browser state, kept in a private cookie between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub logged_in: bool,
    pub current_user: Option<String>,
    pub page: Page,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ShowSignup,
    ShowLogin,
    LoggedIn { username: String, has_profile: bool },
    SignedUp { username: String },
    /// Profile URL saved and its scraped data is on disk.
    ProfileReady,
    /// Profile URL or scraped data missing for a logged-in user.
    ProfileMissing,
    /// Account vanished from the store.
    SessionLost,
    Logout,
}

/// Next session for `event`. Pending messages survive every transition.
pub fn transition(mut session: Session, event: Event) -> Session {
    let messages = std::mem::take(&mut session.messages);

    let mut next = match event {
        Event::ShowSignup if !session.logged_in => Session {
            page: Page::Signup,
            ..session
        },
        Event::ShowLogin if !session.logged_in => Session {
            page: Page::Login,
            ..session
        },
        Event::LoggedIn { username, has_profile } => Session {
            logged_in: true,
            current_user: Some(username),
            page: if has_profile {
                Page::ApplyForRoles
            } else {
                Page::SetupProfile
            },
            messages: Vec::new(),
        },
        Event::SignedUp { username } => Session {
            logged_in: true,
            current_user: Some(username),
            page: Page::SetupProfile,
            messages: Vec::new(),
        },
        Event::ProfileReady if session.logged_in => Session {
            page: Page::ApplyForRoles,
            ..session
        },
        Event::ProfileMissing if session.logged_in => Session {
            page: Page::SetupProfile,
            ..session
        },
        Event::SessionLost | Event::Logout => Session::default(),
        _ => session,
    };

    next.messages = messages;
    next.resolve()
}

impl Session {
    /// Pages behind the login fall back to Login for anonymous sessions.
    pub fn resolve(self) -> Self {
        if self.page.requires_login() && !self.is_authenticated() {
            return Session {
                messages: self.messages,
                ..Session::default()
            };
        }
        self
    }

    fn is_authenticated(&self) -> bool {
        self.logged_in && self.current_user.is_some()
    }

    pub fn user(&self) -> Option<&str> {
        if self.logged_in {
            self.current_user.as_deref()
        } else {
            None
        }
    }

    pub fn push(&mut self, class: MessageClass, text: impl Into<String>) {
        self.messages.push(Message {
            class,
            text: text.into(),
        });
    }

    pub fn take_messages(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.messages)
    }

    pub fn from_cookies(cookies: &CookieJar<'_>) -> Self {
        let session: Session = cookies
            .get_private(SESSION_COOKIE)
            .and_then(|cookie| serde_json::from_str(cookie.value()).ok())
            .unwrap_or_default();
        session.resolve()
    }

    pub fn store(&self, cookies: &CookieJar<'_>) {
        match serde_json::to_string(self) {
            Ok(value) => cookies.add_private(Cookie::new(SESSION_COOKIE, value)),
            Err(e) => debug!("Session not stored: {}", e),
        }
    }
}
