//! Authentication endpoints.
//!
//! These calls go straight to the [`Transport`], bypassing the middleware
//! pipeline of [`HttpClient`](crate::http::HttpClient). Nothing on this path
//! can trigger a refresh, which rules out refresh-triggered-by-refresh loops
//! by construction.

use std::sync::Arc;

use async_trait::async_trait;
use ledger_domain::{AccessToken, ApiRequest, ApiResponse, Credentials};
use serde::Deserialize;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::ports::Transport;

/// Paths of the authentication endpoints, relative to the API base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRoutes {
    /// Exchanges credentials for an access token and sets the refresh cookie.
    pub login: String,
    /// Mints a new access token from the refresh cookie.
    pub refresh: String,
    /// Invalidates the refresh cookie.
    pub logout: String,
}

impl AuthRoutes {
    /// Returns true if `path` targets one of the authentication endpoints.
    #[must_use]
    pub fn is_auth_path(&self, path: &str) -> bool {
        let path = normalize(path);
        [&self.login, &self.refresh, &self.logout]
            .iter()
            .any(|route| normalize(route) == path)
    }
}

impl Default for AuthRoutes {
    fn default() -> Self {
        Self {
            login: "token/".to_string(),
            refresh: "token/refresh/".to_string(),
            logout: "token/logout/".to_string(),
        }
    }
}

fn normalize(path: &str) -> &str {
    path.split('?')
        .next()
        .unwrap_or_default()
        .trim_matches('/')
}

/// Port for the authentication endpoints.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchanges credentials for an access token.
    async fn login(&self, credentials: &Credentials) -> ApiResult<AccessToken>;

    /// Obtains a new access token using the server-held refresh credential.
    async fn refresh(&self) -> ApiResult<AccessToken>;

    /// Invalidates the server-held refresh credential.
    async fn logout(&self) -> ApiResult<()>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access: Option<String>,
}

/// [`AuthApi`] over a raw transport.
pub struct TransportAuthApi {
    transport: Arc<dyn Transport>,
    routes: AuthRoutes,
}

impl TransportAuthApi {
    /// Creates the endpoint client.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, routes: AuthRoutes) -> Self {
        Self { transport, routes }
    }

    /// Returns the configured routes.
    #[must_use]
    pub const fn routes(&self) -> &AuthRoutes {
        &self.routes
    }

    async fn post(&self, path: &str, body: &serde_json::Value) -> ApiResult<ApiResponse> {
        let request = ApiRequest::post(path, body)?;
        debug!(request_id = %request.id, path, "calling auth endpoint");
        Ok(self.transport.send(&request).await?)
    }

    fn read_token(response: &ApiResponse) -> ApiResult<AccessToken> {
        let body: TokenResponse = response
            .json_body()
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        let access = body.access.ok_or(ApiError::MissingAccessToken)?;
        AccessToken::new(access).map_err(|_| ApiError::MissingAccessToken)
    }
}

#[async_trait]
impl AuthApi for TransportAuthApi {
    async fn login(&self, credentials: &Credentials) -> ApiResult<AccessToken> {
        let body = serde_json::to_value(credentials).map_err(|e| ApiError::Decode(e.to_string()))?;
        let response = self.post(&self.routes.login, &body).await?;
        if !response.is_success() {
            return Err(ApiError::from_response(&response));
        }
        Self::read_token(&response)
    }

    async fn refresh(&self) -> ApiResult<AccessToken> {
        let response = self
            .post(&self.routes.refresh, &serde_json::json!({}))
            .await?;
        if !response.is_success() {
            return Err(ApiError::RefreshFailed {
                status: response.status,
            });
        }
        Self::read_token(&response)
    }

    async fn logout(&self) -> ApiResult<()> {
        let response = self
            .post(&self.routes.logout, &serde_json::json!({}))
            .await?;
        if response.is_success() {
            Ok(())
        } else {
            Err(ApiError::from_response(&response))
        }
    }
}
