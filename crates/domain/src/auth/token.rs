//! Access token and login credential types.
//!
//! Neither type implements `Serialize` for its secret part: access tokens
//! live in memory only, and passwords only ever leave the process inside a
//! login request body.

use std::fmt;

use serde::Serialize;

use crate::error::{DomainError, DomainResult};

/// Short-lived bearer credential authorizing protected calls.
///
/// The value is opaque to the client. `Debug` only shows a preview so the
/// token does not end up in logs.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a raw token string.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or contains whitespace, since
    /// it could not be carried in an `Authorization` header.
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(DomainError::InvalidToken("token is empty".to_string()));
        }
        if value.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidToken(
                "token contains whitespace".to_string(),
            ));
        }
        Ok(Self(value))
    }

    /// Returns the raw token value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Formats the value of an `Authorization` header.
    #[must_use]
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.0)
    }

    /// Get a preview of the token (first 8 chars + ...).
    #[must_use]
    pub fn preview(&self) -> String {
        if self.0.len() > 12 {
            let cut = self
                .0
                .char_indices()
                .nth(8)
                .map_or(self.0.len(), |(idx, _)| idx);
            format!("{}...", &self.0[..cut])
        } else {
            "***".to_string()
        }
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&self.preview()).finish()
    }
}

/// Username and password submitted to the login endpoint.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    /// Account name.
    pub username: String,
    /// Plain password, sent once over the login call.
    pub password: String,
}

impl Credentials {
    /// Creates credentials, rejecting blank fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the username or the password is blank.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> DomainResult<Self> {
        let username = username.into();
        let password = password.into();
        if username.trim().is_empty() {
            return Err(DomainError::InvalidCredentials(
                "username is required".to_string(),
            ));
        }
        if password.is_empty() {
            return Err(DomainError::InvalidCredentials(
                "password is required".to_string(),
            ));
        }
        Ok(Self {
            username: username.trim().to_string(),
            password,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
