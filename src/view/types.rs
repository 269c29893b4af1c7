use crate::api::Snippet;

pub const PASSWORD_PROMPT: &str = "This paste is password protected. Please enter the password.";
pub const UNAVAILABLE_MESSAGE: &str =
    "This paste is either expired or was already viewed (one-time view).";
pub const FETCH_FAILED_MESSAGE: &str = "Unable to fetch paste. Check the link or try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewErrorKind {
    /// Expired or already consumed; no retry is offered
    Unavailable,
    /// The request itself failed
    FetchFailed,
}

impl ViewErrorKind {
    pub fn message(&self) -> &'static str {
        match self {
            ViewErrorKind::Unavailable => UNAVAILABLE_MESSAGE,
            ViewErrorKind::FetchFailed => FETCH_FAILED_MESSAGE,
        }
    }
}

/// Where the viewer currently stands
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Loading,
    Authorized(Snippet),
    PasswordRequired,
    Error(ViewErrorKind),
}

impl ViewState {
    pub fn name(&self) -> &'static str {
        match self {
            ViewState::Loading => "loading",
            ViewState::Authorized(_) => "authorized",
            ViewState::PasswordRequired => "password_required",
            ViewState::Error(_) => "error",
        }
    }

    pub fn snippet(&self) -> Option<&Snippet> {
        match self {
            ViewState::Authorized(snippet) => Some(snippet),
            _ => None,
        }
    }

    /// Text shown to the user for this state, if any
    pub fn message(&self) -> Option<&'static str> {
        match self {
            ViewState::PasswordRequired => Some(PASSWORD_PROMPT),
            ViewState::Error(kind) => Some(kind.message()),
            ViewState::Loading | ViewState::Authorized(_) => None,
        }
    }
}
