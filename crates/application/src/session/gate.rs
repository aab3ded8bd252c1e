//! Route access control.

use std::sync::Arc;

use ledger_domain::{Route, SessionState};

use super::bootstrap::BootstrapSession;
use crate::auth::TokenStore;

/// What a view should do for a requested path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Bootstrap has not finished; render nothing yet.
    Loading,
    /// Render the route.
    Render(Route),
    /// Navigate elsewhere.
    Redirect {
        /// Where to go.
        to: Route,
        /// The location originally requested, kept for post-login restoration.
        from: Option<String>,
    },
}

/// Decides access to client routes from the current token state.
#[derive(Debug, Clone)]
pub struct AuthGate {
    tokens: TokenStore,
    bootstrap: Arc<BootstrapSession>,
}

impl AuthGate {
    /// Creates a gate reading from `tokens`, held back until `bootstrap` ends.
    #[must_use]
    pub const fn new(tokens: TokenStore, bootstrap: Arc<BootstrapSession>) -> Self {
        Self { tokens, bootstrap }
    }

    /// Evaluates navigation to `path` against the state at this instant.
    #[must_use]
    pub fn evaluate(&self, path: &str) -> GateDecision {
        if !self.bootstrap.is_complete() {
            return GateDecision::Loading;
        }
        Self::decide(&Route::parse(path), path, self.tokens.is_authenticated())
    }

    /// Waits for bootstrap, starting it if nobody has yet.
    pub async fn ready(&self) -> SessionState {
        self.bootstrap.run().await
    }

    /// Evaluates `path` once bootstrap has finished.
    pub async fn navigate(&self, path: &str) -> GateDecision {
        self.ready().await;
        self.evaluate(path)
    }

    /// Access rules for each route.
    #[must_use]
    pub fn decide(route: &Route, requested: &str, authenticated: bool) -> GateDecision {
        match route {
            Route::Login if authenticated => GateDecision::Redirect {
                to: Route::Dashboard,
                from: None,
            },
            Route::Login | Route::Signup => GateDecision::Render(route.clone()),
            Route::Dashboard if authenticated => GateDecision::Render(Route::Dashboard),
            Route::Dashboard => GateDecision::Redirect {
                to: Route::Login,
                from: Some(requested.to_string()),
            },
            Route::Unknown(_) => GateDecision::Redirect {
                to: Route::Login,
                from: None,
            },
        }
    }

    /// Where to go after a successful login.
    ///
    /// Returns the remembered location if it is a protected route, the
    /// dashboard otherwise.
    #[must_use]
    pub fn post_login_target(from: Option<&str>) -> Route {
        from.map(Route::parse)
            .filter(Route::is_protected)
            .unwrap_or(Route::Dashboard)
    }
}
