//! Outbound API request type

use serde::Serialize;
use uuid::Uuid;

use super::{Headers, HttpMethod};
use crate::error::{DomainError, DomainResult};

/// A call to the budget API, relative to the configured API base.
///
/// The `retried` flag is what bounds authorization recovery: it is set the
/// first time the request is replayed after a refresh and never cleared.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Unique identifier, used to correlate log lines
    pub id: Uuid,
    /// HTTP method
    pub method: HttpMethod,
    /// Path relative to the API base (e.g. `periods/12/`)
    pub path: String,
    /// Query string pairs, in order
    pub query: Vec<(String, String)>,
    /// Request headers
    pub headers: Headers,
    /// Optional JSON body
    pub body: Option<serde_json::Value>,
    retried: bool,
}

impl ApiRequest {
    /// Creates a request for the given method and relative path.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is empty or is an absolute URL: every
    /// call must go through the configured API base.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> DomainResult<Self> {
        let path = path.into();
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidPath("path is empty".to_string()));
        }
        if trimmed.contains("://") {
            return Err(DomainError::InvalidPath(format!(
                "absolute URLs are not allowed: {trimmed}"
            )));
        }
        Ok(Self {
            id: Uuid::now_v7(),
            method,
            path: trimmed.trim_start_matches('/').to_string(),
            query: Vec::new(),
            headers: Headers::new(),
            body: None,
            retried: false,
        })
    }

    /// Creates a GET request.
    ///
    /// # Errors
    ///
    /// See [`ApiRequest::new`].
    pub fn get(path: impl Into<String>) -> DomainResult<Self> {
        Self::new(HttpMethod::Get, path)
    }

    /// Creates a DELETE request.
    ///
    /// # Errors
    ///
    /// See [`ApiRequest::new`].
    pub fn delete(path: impl Into<String>) -> DomainResult<Self> {
        Self::new(HttpMethod::Delete, path)
    }

    /// Creates a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid path or a body that cannot be
    /// represented as JSON.
    pub fn post<B: Serialize + ?Sized>(path: impl Into<String>, body: &B) -> DomainResult<Self> {
        Self::new(HttpMethod::Post, path)?.with_json(body)
    }

    /// Creates a PATCH request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiRequest::post`].
    pub fn patch<B: Serialize + ?Sized>(path: impl Into<String>, body: &B) -> DomainResult<Self> {
        Self::new(HttpMethod::Patch, path)?.with_json(body)
    }

    /// Attaches a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be serialized.
    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> DomainResult<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| DomainError::InvalidBody(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Appends a query pair.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Sets a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Returns true once the request has been replayed after a refresh.
    #[must_use]
    pub const fn is_retried(&self) -> bool {
        self.retried
    }

    /// Marks the request as replayed. There is no way to unset the flag.
    pub const fn mark_retried(&mut self) {
        self.retried = true;
    }
}
