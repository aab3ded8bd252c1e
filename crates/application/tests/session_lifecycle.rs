//! End-to-end session behaviour against an in-memory backend.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use ledger_application::{
    ApiError, BudgetApi, GateDecision, Session, SessionOptions, Transport, TransportError,
};
use ledger_domain::{ApiRequest, ApiResponse, Credentials, Route, SessionState, StatusCode};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

const USERNAME: &str = "alice";
const PASSWORD: &str = "correct horse";

/// Budget backend stand-in: issues access tokens, tracks the refresh cookie
/// and serves one protected collection.
#[derive(Default)]
struct FakeBackend {
    issued: AtomicUsize,
    valid_tokens: Mutex<HashSet<String>>,
    cookie: AtomicBool,
    refresh_calls: AtomicUsize,
    refresh_delay: Duration,
    reject_protected: AtomicBool,
    fail_logout: AtomicBool,
    log: Mutex<Vec<ApiRequest>>,
}

impl FakeBackend {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn with_refresh_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            refresh_delay: delay,
            ..Self::default()
        })
    }

    /// Pretends a previous run left a valid refresh cookie in the jar.
    fn grant_cookie(&self) {
        self.cookie.store(true, Ordering::SeqCst);
    }

    fn revoke_cookie(&self) {
        self.cookie.store(false, Ordering::SeqCst);
    }

    fn expire_access_tokens(&self) {
        self.valid_tokens.lock().clear();
    }

    fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    fn sent_to(&self, path: &str) -> Vec<ApiRequest> {
        self.log
            .lock()
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    fn mint(&self) -> ApiResponse {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let token = format!("access-{n}");
        self.valid_tokens.lock().insert(token.clone());
        ApiResponse::json(200u16, &serde_json::json!({ "access": token }))
    }

    fn login(&self, request: &ApiRequest) -> ApiResponse {
        let body = request.body.clone().unwrap_or_default();
        if body["username"] == USERNAME && body["password"] == PASSWORD {
            self.grant_cookie();
            self.mint()
        } else {
            ApiResponse::json(
                401u16,
                &serde_json::json!({ "detail": "No active account found with the given credentials" }),
            )
        }
    }

    fn refresh(&self) -> ApiResponse {
        if self.cookie.load(Ordering::SeqCst) {
            self.mint()
        } else {
            ApiResponse::json(
                401u16,
                &serde_json::json!({ "detail": "Token is invalid or expired" }),
            )
        }
    }

    fn logout(&self) -> ApiResponse {
        if self.fail_logout.load(Ordering::SeqCst) {
            return ApiResponse::empty(500u16);
        }
        self.revoke_cookie();
        ApiResponse::empty(205u16)
    }

    fn protected(&self, request: &ApiRequest) -> ApiResponse {
        let authorized = request
            .headers
            .get("Authorization")
            .and_then(|h| h.strip_prefix("Bearer "))
            .is_some_and(|t| self.valid_tokens.lock().contains(t));
        if !authorized || self.reject_protected.load(Ordering::SeqCst) {
            return ApiResponse::json(
                401u16,
                &serde_json::json!({ "detail": "Given token not valid for any token type" }),
            );
        }
        ApiResponse::json(
            200u16,
            &serde_json::json!([{
                "id": 1,
                "name": "October",
                "start_date": "2026-10-01",
                "end_date": "2026-10-31",
                "total_savings": "120.00"
            }]),
        )
    }

    async fn handle(&self, request: &ApiRequest) -> ApiResponse {
        self.log.lock().push(request.clone());
        match request.path.as_str() {
            "token/" => self.login(request),
            "token/refresh/" => {
                self.refresh_calls.fetch_add(1, Ordering::SeqCst);
                // The cookie is checked on arrival; only the reply is slow.
                let response = self.refresh();
                tokio::time::sleep(self.refresh_delay).await;
                response
            }
            "token/logout/" => self.logout(),
            _ => self.protected(request),
        }
    }
}

impl Transport for FakeBackend {
    fn send<'a>(
        &'a self,
        request: &'a ApiRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + Send + 'a>> {
        Box::pin(async move { Ok(self.handle(request).await) })
    }
}

fn session(backend: &Arc<FakeBackend>) -> Session {
    Session::new(backend.clone(), SessionOptions::default())
}

fn credentials() -> Credentials {
    Credentials::new(USERNAME, PASSWORD).unwrap()
}

#[tokio::test]
async fn test_bootstrap_with_valid_cookie_opens_dashboard() {
    let backend = FakeBackend::new();
    backend.grant_cookie();
    let session = session(&backend);

    assert_eq!(session.gate().evaluate("/dashboard"), GateDecision::Loading);
    assert_eq!(session.bootstrap().await, SessionState::Authenticated);
    assert_eq!(
        session.gate().evaluate("/dashboard"),
        GateDecision::Render(Route::Dashboard)
    );

    let periods = BudgetApi::new(session.client()).periods.list(&[]).await.unwrap();
    assert_eq!(periods[0].name, "October");
    assert_eq!(backend.refresh_calls(), 1);
}

#[tokio::test]
async fn test_bootstrap_without_cookie_shows_login() {
    let backend = FakeBackend::new();
    let session = session(&backend);

    assert_eq!(session.bootstrap().await, SessionState::Anonymous);
    assert_eq!(
        session.gate().evaluate("/dashboard"),
        GateDecision::Redirect {
            to: Route::Login,
            from: Some("/dashboard".to_string())
        }
    );
    assert_eq!(session.gate().evaluate("/"), GateDecision::Render(Route::Login));
    assert_eq!(backend.refresh_calls(), 1);
}

#[tokio::test]
async fn test_expired_token_is_refreshed_transparently() {
    let backend = FakeBackend::new();
    let session = session(&backend);
    session.login(&credentials()).await.unwrap();
    backend.expire_access_tokens();

    let periods = BudgetApi::new(session.client()).periods.list(&[]).await.unwrap();

    assert_eq!(periods.len(), 1);
    assert_eq!(backend.refresh_calls(), 1);
    let attempts = backend.sent_to("periods/");
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[0].headers.get("Authorization"), Some("Bearer access-1"));
    assert_eq!(attempts[1].headers.get("Authorization"), Some("Bearer access-2"));
    assert_eq!(session.tokens().get().unwrap().as_str(), "access-2");
    assert_eq!(session.state(), SessionState::Authenticated);
}

#[tokio::test]
async fn test_failed_refresh_clears_session_and_surfaces_unauthorized() {
    let backend = FakeBackend::new();
    let session = session(&backend);
    session.bootstrap().await;
    session.login(&credentials()).await.unwrap();
    backend.expire_access_tokens();
    backend.revoke_cookie();

    let err = BudgetApi::new(session.client())
        .periods
        .list(&[])
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(session.state(), SessionState::Anonymous);
    assert!(session.tokens().get().is_none());
    assert!(matches!(
        session.gate().evaluate("/dashboard"),
        GateDecision::Redirect { to: Route::Login, .. }
    ));
    // One from bootstrap, one from the 401; neither retried.
    assert_eq!(backend.refresh_calls(), 2);
    assert_eq!(backend.sent_to("periods/").len(), 1);
}

#[tokio::test]
async fn test_concurrent_unauthorized_requests_share_one_refresh() {
    let backend = FakeBackend::with_refresh_delay(Duration::from_millis(50));
    let session = session(&backend);
    session.login(&credentials()).await.unwrap();
    backend.expire_access_tokens();
    let api = BudgetApi::new(session.client());

    let results = futures::future::join_all((0..6).map(|_| api.periods.list(&[]))).await;

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(backend.refresh_calls(), 1);
    let replays: Vec<_> = backend
        .sent_to("periods/")
        .into_iter()
        .filter(ApiRequest::is_retried)
        .collect();
    assert_eq!(replays.len(), 6);
    assert!(
        replays
            .iter()
            .all(|r| r.headers.get("Authorization") == Some("Bearer access-2"))
    );
}

#[tokio::test]
async fn test_state_is_refreshing_while_flight_is_active() {
    let backend = FakeBackend::with_refresh_delay(Duration::from_millis(100));
    let session = session(&backend);
    session.login(&credentials()).await.unwrap();
    backend.expire_access_tokens();
    let api = BudgetApi::new(session.client());

    let (result, observed) = tokio::join!(api.periods.list(&[]), async {
        tokio::time::sleep(Duration::from_millis(30)).await;
        session.state()
    });

    result.unwrap();
    assert_eq!(observed, SessionState::Refreshing);
    assert_eq!(session.state(), SessionState::Authenticated);
}

#[tokio::test]
async fn test_request_is_retried_at_most_once() {
    let backend = FakeBackend::new();
    let session = session(&backend);
    session.login(&credentials()).await.unwrap();
    backend.reject_protected.store(true, Ordering::SeqCst);

    let err = BudgetApi::new(session.client())
        .periods
        .list(&[])
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(backend.sent_to("periods/").len(), 2);
    assert_eq!(backend.refresh_calls(), 1);
}

#[tokio::test]
async fn test_rejected_login_is_not_retried() {
    let backend = FakeBackend::new();
    let session = session(&backend);

    let err = session
        .login(&Credentials::new(USERNAME, "wrong").unwrap())
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(backend.sent_to("token/").len(), 1);
    assert_eq!(backend.refresh_calls(), 0);
    assert_eq!(session.state(), SessionState::Anonymous);
}

#[tokio::test]
async fn test_logout_revokes_cookie() {
    let backend = FakeBackend::new();
    let session = session(&backend);
    session.login(&credentials()).await.unwrap();

    session.logout().await.unwrap();

    assert_eq!(session.state(), SessionState::Anonymous);
    assert!(!backend.cookie.load(Ordering::SeqCst));
    let restarted = Session::new(backend.clone(), SessionOptions::default());
    assert_eq!(restarted.bootstrap().await, SessionState::Anonymous);
}

#[tokio::test]
async fn test_logout_clears_locally_even_when_server_fails() {
    let backend = FakeBackend::new();
    let session = session(&backend);
    session.login(&credentials()).await.unwrap();
    backend.fail_logout.store(true, Ordering::SeqCst);

    let err = session.logout().await.unwrap_err();

    assert_eq!(
        err,
        ApiError::Http {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: None
        }
    );
    assert!(session.tokens().get().is_none());
}

#[tokio::test]
async fn test_logout_during_refresh_stays_logged_out() {
    let backend = FakeBackend::with_refresh_delay(Duration::from_millis(100));
    let session = session(&backend);
    session.login(&credentials()).await.unwrap();
    backend.expire_access_tokens();
    let api = BudgetApi::new(session.client());

    let (result, logout) = tokio::join!(api.periods.list(&[]), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        session.logout().await
    });

    logout.unwrap();
    assert!(result.unwrap_err().is_unauthorized());
    assert_eq!(session.state(), SessionState::Anonymous);
    assert!(session.tokens().get().is_none());
    assert_eq!(backend.refresh_calls(), 1);
    assert_eq!(backend.sent_to("periods/").len(), 1);
}

#[tokio::test]
async fn test_invalidate_during_refresh_is_not_undone() {
    let backend = FakeBackend::with_refresh_delay(Duration::from_millis(100));
    let session = session(&backend);
    session.login(&credentials()).await.unwrap();
    session.bootstrap().await;
    backend.expire_access_tokens();
    let api = BudgetApi::new(session.client());

    let (result, ()) = tokio::join!(api.periods.list(&[]), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        session.invalidate();
    });

    assert!(result.unwrap_err().is_unauthorized());
    assert_eq!(session.state(), SessionState::Anonymous);
    assert!(matches!(
        session.gate().evaluate("/dashboard"),
        GateDecision::Redirect { to: Route::Login, .. }
    ));
}

#[tokio::test]
async fn test_invalidate_denies_protected_routes() {
    let backend = FakeBackend::new();
    backend.grant_cookie();
    let session = session(&backend);
    session.bootstrap().await;

    session.invalidate();

    assert_eq!(session.state(), SessionState::Anonymous);
    assert!(matches!(
        session.gate().evaluate("/dashboard"),
        GateDecision::Redirect { to: Route::Login, .. }
    ));
}

#[tokio::test]
async fn test_period_filter_is_sent_as_query() {
    let backend = FakeBackend::new();
    let session = session(&backend);
    session.login(&credentials()).await.unwrap();

    BudgetApi::new(session.client())
        .periods
        .list_for_period(7)
        .await
        .unwrap();

    let sent = backend.sent_to("periods/");
    assert_eq!(sent[0].query, vec![("period".to_string(), "7".to_string())]);
}
