//! Session-level state.

use std::fmt;

/// Where the client currently stands with respect to authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// No access token is held.
    #[default]
    Anonymous,
    /// An access token is held.
    Authenticated,
    /// A silent refresh is in flight.
    Refreshing,
}

impl SessionState {
    /// Derives the state from the two observable facts of a session.
    #[must_use]
    pub const fn from_parts(has_token: bool, refreshing: bool) -> Self {
        if refreshing {
            Self::Refreshing
        } else if has_token {
            Self::Authenticated
        } else {
            Self::Anonymous
        }
    }

    /// Returns true for [`SessionState::Authenticated`].
    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated)
    }

    /// Returns the state as a static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::Authenticated => "authenticated",
            Self::Refreshing => "refreshing",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
