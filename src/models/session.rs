use std::collections::HashMap;

use serde::Serialize;

use crate::error::AppError;

/// Which page a user is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    LoggedOut,
    Home,
    Trade,
    Portfolio,
}

impl View {
    /// Views reachable from the menu once logged in.
    pub const MENU: [View; 3] = [View::Home, View::Trade, View::Portfolio];

    pub fn from_name(name: &str) -> Option<View> {
        match name.trim().to_ascii_lowercase().as_str() {
            "home" => Some(View::Home),
            "trade" => Some(View::Trade),
            "portfolio" => Some(View::Portfolio),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            View::LoggedOut => "logged_out",
            View::Home => "home",
            View::Trade => "trade",
            View::Portfolio => "portfolio",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            View::LoggedOut => "/login",
            View::Home => "/home",
            View::Trade => "/trade",
            View::Portfolio => "/portfolio",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::LoggedOut => "Login",
            View::Home => "Market summary",
            View::Trade => "Trade",
            View::Portfolio => "Portfolio",
        }
    }

    /// Menu selection. Allowed between any two authenticated views,
    /// never out of `LoggedOut`.
    pub fn select(self, target: View) -> Result<View, AppError> {
        match (self, target) {
            (View::LoggedOut, _) => Err(AppError::NotAuthenticated),
            (_, View::LoggedOut) => Err(AppError::InvalidInput("Use logout to leave.".into())),
            (_, t) => Ok(t),
        }
    }
}

/// Selected view per logged-in user. Entries are created at login and
/// dropped at logout; a user without an entry is `LoggedOut`.
#[derive(Debug, Default)]
pub struct Sessions {
    views: HashMap<String, View>,
}

impl Sessions {
    pub fn view_of(&self, username: &str) -> View {
        self.views.get(username).copied().unwrap_or(View::LoggedOut)
    }

    pub fn login(&mut self, username: &str) -> View {
        self.views.insert(username.to_string(), View::Home);
        View::Home
    }

    pub fn logout(&mut self, username: &str) {
        self.views.remove(username);
    }

    /// Holders of a valid auth cookie count as logged in even when the
    /// process restarted since their login; they land back on `Home`.
    pub fn resume(&mut self, username: &str) -> View {
        *self.views.entry(username.to_string()).or_insert(View::Home)
    }

    pub fn select(&mut self, username: &str, target: View) -> Result<View, AppError> {
        let next = self.view_of(username).select(target)?;
        self.views.insert(username.to_string(), next);
        Ok(next)
    }
}
