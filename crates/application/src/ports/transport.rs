//! Transport port

use std::future::Future;
use std::pin::Pin;

use ledger_domain::{ApiRequest, ApiResponse};
use thiserror::Error;

/// Errors raised below HTTP: no response was received at all.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The server could not be reached.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The request did not complete in time.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout that elapsed.
        timeout_ms: u64,
    },

    /// The request URL could not be built from the API base.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Any other transport failure.
    #[error("transport error: {0}")]
    Other(String),
}

/// Port for sending a single request to the API and reading the response.
///
/// Implementations must not interpret the status code: a 401 is a regular
/// `Ok` response here. They are expected to keep cookies across calls, since
/// the refresh credential travels as a cookie.
pub trait Transport: Send + Sync {
    /// Sends the request exactly as given.
    ///
    /// # Errors
    ///
    /// Returns an error only when no HTTP response was received.
    fn send<'a>(
        &'a self,
        request: &'a ApiRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + Send + 'a>>;
}
