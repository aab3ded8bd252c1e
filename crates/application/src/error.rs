//! Application error types

use ledger_domain::{ApiResponse, DomainError, StatusCode};
use thiserror::Error;

use crate::ports::TransportError;

/// Errors surfaced to callers of the API client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// No response was received.
    #[error("network error: {0}")]
    Network(String),

    /// The request did not complete in time.
    #[error("request timed out")]
    Timeout,

    /// The server rejected the call with 401 and recovery did not help.
    #[error("unauthorized{}", detail_suffix(.detail))]
    Unauthorized {
        /// Server-provided reason, if any.
        detail: Option<String>,
    },

    /// The refresh endpoint rejected the refresh credential.
    #[error("token refresh rejected with status {status}")]
    RefreshFailed {
        /// Status returned by the refresh endpoint.
        status: StatusCode,
    },

    /// Any other non-success status.
    #[error("HTTP {status}{}", detail_suffix(.detail))]
    Http {
        /// Response status.
        status: StatusCode,
        /// Server-provided reason, if any.
        detail: Option<String>,
    },

    /// The response body did not have the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),

    /// An auth endpoint answered with success but no access token.
    #[error("no access token received")]
    MissingAccessToken,

    /// The request could not be built.
    #[error("invalid request: {0}")]
    Domain(#[from] DomainError),
}

impl ApiError {
    /// Classifies a non-success response.
    #[must_use]
    pub fn from_response(response: &ApiResponse) -> Self {
        let detail = response.error_detail();
        if response.is_unauthorized() {
            Self::Unauthorized { detail }
        } else {
            Self::Http {
                status: response.status,
                detail,
            }
        }
    }

    /// Returns true for [`ApiError::Unauthorized`].
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Returns the HTTP status behind the error, if there was a response.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            Self::RefreshFailed { status } | Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout { .. } => Self::Timeout,
            other => Self::Network(other.to_string()),
        }
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
}

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
