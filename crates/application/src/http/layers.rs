//! Authorization layers.

use async_trait::async_trait;
use ledger_domain::{ApiRequest, ApiResponse};
use tracing::debug;

use super::pipeline::{RequestLayer, ResponseAction, ResponseLayer};
use crate::auth::{AuthRoutes, RefreshCoordinator, TokenStore};

/// Attaches `Authorization: Bearer <token>` when a token is held.
///
/// Without a token the request goes out unauthenticated; the server decides.
#[derive(Debug, Clone)]
pub struct BearerAuth {
    tokens: TokenStore,
}

impl BearerAuth {
    /// Creates the layer reading from `tokens`.
    #[must_use]
    pub const fn new(tokens: TokenStore) -> Self {
        Self { tokens }
    }
}

impl RequestLayer for BearerAuth {
    fn on_request(&self, request: &mut ApiRequest) {
        if let Some(token) = self.tokens.get() {
            request.headers.set("Authorization", token.bearer_header());
        }
    }
}

/// Recovers from a 401 with one refresh and one replay.
///
/// Responses pass through untouched when they are not 401, when they come
/// from an auth endpoint, or when the request was already replayed once.
#[derive(Debug, Clone)]
pub struct Reauthenticate {
    refresher: RefreshCoordinator,
    routes: AuthRoutes,
}

impl Reauthenticate {
    /// Creates the layer.
    #[must_use]
    pub const fn new(refresher: RefreshCoordinator, routes: AuthRoutes) -> Self {
        Self { refresher, routes }
    }
}

#[async_trait]
impl ResponseLayer for Reauthenticate {
    async fn on_response(
        &self,
        request: &mut ApiRequest,
        response: ApiResponse,
    ) -> ResponseAction {
        if !response.is_unauthorized()
            || request.is_retried()
            || self.routes.is_auth_path(&request.path)
        {
            return ResponseAction::Pass(response);
        }

        request.mark_retried();
        debug!(request_id = %request.id, path = %request.path, "401 received, refreshing");
        match self.refresher.refresh().await {
            Some(_) => ResponseAction::Replay { original: response },
            None => ResponseAction::Pass(response),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::auth::AuthApi;
    use crate::error::{ApiError, ApiResult};
    use ledger_domain::{AccessToken, Credentials, StatusCode};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingAuth {
        refreshes: AtomicUsize,
        succeed: bool,
    }

    #[async_trait]
    impl AuthApi for CountingAuth {
        async fn login(&self, _credentials: &Credentials) -> ApiResult<AccessToken> {
            unreachable!("login is not used here")
        }

        async fn refresh(&self) -> ApiResult<AccessToken> {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            if self.succeed {
                Ok(AccessToken::new("fresh").unwrap())
            } else {
                Err(ApiError::RefreshFailed {
                    status: StatusCode::UNAUTHORIZED,
                })
            }
        }

        async fn logout(&self) -> ApiResult<()> {
            Ok(())
        }
    }

    fn layer(succeed: bool) -> (Reauthenticate, Arc<CountingAuth>, TokenStore) {
        let api = Arc::new(CountingAuth {
            refreshes: AtomicUsize::new(0),
            succeed,
        });
        let tokens = TokenStore::new();
        let refresher = RefreshCoordinator::new(api.clone(), tokens.clone());
        (
            Reauthenticate::new(refresher, AuthRoutes::default()),
            api,
            tokens,
        )
    }

    #[test]
    fn test_bearer_header_attached_when_token_held() {
        let tokens = TokenStore::new();
        let bearer = BearerAuth::new(tokens.clone());

        let mut anonymous = ApiRequest::get("periods/").unwrap();
        bearer.on_request(&mut anonymous);
        assert!(!anonymous.headers.contains("Authorization"));

        tokens.set(AccessToken::new("abc").unwrap());
        let mut authed = ApiRequest::get("periods/").unwrap();
        bearer.on_request(&mut authed);
        assert_eq!(authed.headers.get("authorization"), Some("Bearer abc"));
    }

    #[tokio::test]
    async fn test_unauthorized_triggers_refresh_and_replay() {
        let (layer, api, tokens) = layer(true);
        let mut request = ApiRequest::get("periods/").unwrap();

        let action = layer
            .on_response(&mut request, ApiResponse::empty(401u16))
            .await;

        assert!(matches!(action, ResponseAction::Replay { .. }));
        assert!(request.is_retried());
        assert_eq!(api.refreshes.load(Ordering::SeqCst), 1);
        assert_eq!(tokens.get().unwrap().as_str(), "fresh");
    }

    #[tokio::test]
    async fn test_failed_refresh_passes_original_response() {
        let (layer, _, tokens) = layer(false);
        let mut request = ApiRequest::get("periods/").unwrap();

        let action = layer
            .on_response(&mut request, ApiResponse::empty(401u16))
            .await;

        match action {
            ResponseAction::Pass(response) => assert!(response.is_unauthorized()),
            ResponseAction::Replay { .. } => panic!("expected pass-through"),
        }
        assert!(!tokens.is_authenticated());
    }

    #[tokio::test]
    async fn test_retried_request_is_not_refreshed_again() {
        let (layer, api, _) = layer(true);
        let mut request = ApiRequest::get("periods/").unwrap();
        request.mark_retried();

        let action = layer
            .on_response(&mut request, ApiResponse::empty(401u16))
            .await;

        assert!(matches!(action, ResponseAction::Pass(_)));
        assert_eq!(api.refreshes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_auth_endpoints_are_exempt() {
        let (layer, api, _) = layer(true);
        for path in ["token/", "token/refresh/", "token/logout/"] {
            let mut request = ApiRequest::post(path, &serde_json::json!({})).unwrap();
            let action = layer
                .on_response(&mut request, ApiResponse::empty(401u16))
                .await;
            assert!(matches!(action, ResponseAction::Pass(_)));
            assert!(!request.is_retried());
        }
        assert_eq!(api.refreshes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_other_statuses_pass_through() {
        let (layer, api, _) = layer(true);
        let mut request = ApiRequest::get("periods/").unwrap();

        for status in [200u16, 403, 500] {
            let action = layer
                .on_response(&mut request, ApiResponse::empty(status))
                .await;
            assert!(matches!(action, ResponseAction::Pass(_)));
        }
        assert_eq!(api.refreshes.load(Ordering::SeqCst), 0);
    }
}
