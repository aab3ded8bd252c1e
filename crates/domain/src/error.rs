//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An access token was empty or contained whitespace.
    #[error("invalid access token: {0}")]
    InvalidToken(String),

    /// Login credentials are incomplete.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// A request path is invalid (absolute URL or empty).
    #[error("invalid request path: {0}")]
    InvalidPath(String),

    /// A request body could not be represented as JSON.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// A monetary amount could not be read.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
