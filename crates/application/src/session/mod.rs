//! Session context.
//!
//! [`Session`] is built once at startup and owns every piece of
//! authentication state. Views and resource clients borrow what they need
//! from it; nothing else holds credentials.

mod bootstrap;
mod gate;

use std::sync::Arc;
use std::time::Duration;

use ledger_domain::{AccessToken, Credentials, SessionState};
use tracing::{info, warn};

pub use bootstrap::BootstrapSession;
pub use gate::{AuthGate, GateDecision};

use crate::auth::{
    AuthApi, AuthRoutes, DEFAULT_REFRESH_TIMEOUT, RefreshCoordinator, TokenStore, TransportAuthApi,
};
use crate::error::ApiResult;
use crate::http::{BearerAuth, HttpClient, Reauthenticate};
use crate::ports::{LegacyCredentials, Transport};

/// Options for building a [`Session`].
#[derive(Clone)]
pub struct SessionOptions {
    /// Authentication endpoint paths.
    pub routes: AuthRoutes,
    /// Upper bound for one refresh call.
    pub refresh_timeout: Duration,
    /// Durable credential left by older builds, purged during bootstrap.
    pub legacy: Option<Arc<dyn LegacyCredentials>>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            routes: AuthRoutes::default(),
            refresh_timeout: DEFAULT_REFRESH_TIMEOUT,
            legacy: None,
        }
    }
}

impl std::fmt::Debug for SessionOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionOptions")
            .field("routes", &self.routes)
            .field("refresh_timeout", &self.refresh_timeout)
            .field("legacy", &self.legacy.is_some())
            .finish()
    }
}

/// The authentication context of one running client.
pub struct Session {
    tokens: TokenStore,
    auth: Arc<dyn AuthApi>,
    refresher: RefreshCoordinator,
    client: HttpClient,
    bootstrap: Arc<BootstrapSession>,
    gate: AuthGate,
}

impl Session {
    /// Builds a session sending everything through `transport`.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, options: SessionOptions) -> Self {
        let auth = Arc::new(TransportAuthApi::new(
            Arc::clone(&transport),
            options.routes.clone(),
        ));
        Self::with_auth_api(transport, auth, options)
    }

    /// Builds a session with a custom authentication endpoint client.
    #[must_use]
    pub fn with_auth_api(
        transport: Arc<dyn Transport>,
        auth: Arc<dyn AuthApi>,
        options: SessionOptions,
    ) -> Self {
        let tokens = TokenStore::new();
        let refresher = RefreshCoordinator::with_timeout(
            Arc::clone(&auth),
            tokens.clone(),
            options.refresh_timeout,
        );
        let client = HttpClient::new(transport)
            .with_request_layer(BearerAuth::new(tokens.clone()))
            .with_response_layer(Reauthenticate::new(refresher.clone(), options.routes));
        let bootstrap = Arc::new(BootstrapSession::new(
            tokens.clone(),
            refresher.clone(),
            options.legacy,
        ));
        let gate = AuthGate::new(tokens.clone(), Arc::clone(&bootstrap));

        Self {
            tokens,
            auth,
            refresher,
            client,
            bootstrap,
            gate,
        }
    }

    /// Logs in and stores the access token.
    ///
    /// # Errors
    ///
    /// Surfaces the login endpoint's error unchanged; login is never retried.
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<AccessToken> {
        let token = self.auth.login(credentials).await?;
        self.tokens.set(token.clone());
        info!(username = %credentials.username, "logged in");
        Ok(token)
    }

    /// Logs out on the server and clears the local session.
    ///
    /// The token store is cleared whatever the server answered.
    ///
    /// # Errors
    ///
    /// Returns the logout endpoint's error after the local state was cleared.
    pub async fn logout(&self) -> ApiResult<()> {
        let result = self.auth.logout().await;
        self.tokens.clear();
        match &result {
            Ok(()) => info!("logged out"),
            Err(err) => warn!(error = %err, "logout request failed, local session cleared"),
        }
        result
    }

    /// Drops the access token without contacting the server.
    pub fn invalidate(&self) {
        if self.tokens.clear() {
            info!("session invalidated");
        }
    }

    /// Current session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        SessionState::from_parts(
            self.tokens.is_authenticated(),
            self.refresher.is_refreshing(),
        )
    }

    /// Runs bootstrap, or waits for the run already under way.
    pub async fn bootstrap(&self) -> SessionState {
        self.bootstrap.run().await
    }

    /// The route gate bound to this session.
    #[must_use]
    pub const fn gate(&self) -> &AuthGate {
        &self.gate
    }

    /// The intercepted API client.
    #[must_use]
    pub const fn client(&self) -> &HttpClient {
        &self.client
    }

    /// The token store.
    #[must_use]
    pub const fn tokens(&self) -> &TokenStore {
        &self.tokens
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state())
            .field("bootstrap", &self.bootstrap)
            .finish_non_exhaustive()
    }
}
