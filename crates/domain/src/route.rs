//! Client-side routes and their access rules

use std::fmt;

/// A navigable location of the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/`, the unauthenticated entry point showing the login form
    Login,
    /// `/signup`, public account creation
    Signup,
    /// `/dashboard`, the protected budget overview
    Dashboard,
    /// Any other path
    Unknown(String),
}

impl Route {
    /// Resolves a path, ignoring query string, fragment and trailing slashes.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');
        match path {
            "" => Self::Login,
            "/signup" => Self::Signup,
            "/dashboard" => Self::Dashboard,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Returns true if rendering requires an access token.
    #[must_use]
    pub const fn is_protected(&self) -> bool {
        matches!(self, Self::Dashboard)
    }

    /// Returns the canonical path.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Login => "/",
            Self::Signup => "/signup",
            Self::Dashboard => "/dashboard",
            Self::Unknown(path) => path,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
