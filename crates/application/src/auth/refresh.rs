//! Coalesced access token refresh.

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use ledger_domain::AccessToken;
use tracing::{info, warn};

use super::api::AuthApi;
use super::single_flight::{Joined, SingleFlight};
use super::token_store::{Generation, TokenStore};

/// Default upper bound for a single refresh call.
pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum FlightKind {
    Refresh,
}

struct Inner {
    api: Arc<dyn AuthApi>,
    tokens: TokenStore,
    flights: SingleFlight<FlightKind, Option<AccessToken>>,
    timeout: Duration,
}

impl Inner {
    /// Runs one refresh and commits its outcome if the session is unchanged
    /// since `started`.
    async fn perform(self: Arc<Self>, started: Generation) -> Option<AccessToken> {
        let refreshed = match tokio::time::timeout(self.timeout, self.api.refresh()).await {
            Ok(Ok(token)) => Some(token),
            Ok(Err(err)) => {
                warn!(error = %err, "token refresh failed");
                None
            }
            Err(_) => {
                warn!(
                    timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                    "token refresh timed out"
                );
                None
            }
        };

        match refreshed {
            Some(token) if self.tokens.set_if_current(started, token.clone()) => {
                info!(token = %token.preview(), "access token refreshed");
                Some(token)
            }
            None if self.tokens.clear_if_current(started) => {
                info!("session cleared after failed refresh");
                None
            }
            _ => {
                info!("session changed during refresh, outcome discarded");
                None
            }
        }
    }
}

/// Ensures at most one refresh call is outstanding at any time.
///
/// Every caller arriving while a refresh is running receives that refresh's
/// outcome. The outcome is written to the [`TokenStore`] before any caller
/// is resumed: the new token on success, an empty store on failure. If the
/// store was written after the refresh started (a login, logout or
/// invalidation), the outcome is dropped and callers receive `None`.
///
/// The refresh runs on its own task, so it settles and updates the store
/// even if every caller waiting on it is dropped.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

impl RefreshCoordinator {
    /// Creates a coordinator writing into `tokens`.
    #[must_use]
    pub fn new(api: Arc<dyn AuthApi>, tokens: TokenStore) -> Self {
        Self::with_timeout(api, tokens, DEFAULT_REFRESH_TIMEOUT)
    }

    /// Creates a coordinator with a custom refresh timeout.
    #[must_use]
    pub fn with_timeout(api: Arc<dyn AuthApi>, tokens: TokenStore, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                tokens,
                flights: SingleFlight::new(),
                timeout,
            }),
        }
    }

    /// Refreshes the access token, joining a refresh already in flight.
    ///
    /// Returns the new token, or `None` if the refresh failed, timed out, or
    /// the session was changed while it ran.
    /// Must be called from within a Tokio runtime.
    pub async fn refresh(&self) -> Option<AccessToken> {
        let inner = Arc::clone(&self.inner);
        let joined = self.inner.flights.join(FlightKind::Refresh, move || {
            let started = inner.tokens.generation();
            inner.perform(started)
        });

        let handle = match joined {
            Joined::Started(handle) => {
                tokio::spawn(handle.clone().map(drop));
                handle
            }
            Joined::Shared(handle) => handle,
        };
        handle.await
    }

    /// Returns true while a refresh is in flight.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.inner.flights.is_active(&FlightKind::Refresh)
    }

    /// Returns the store this coordinator writes into.
    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        &self.inner.tokens
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("refreshing", &self.is_refreshing())
            .field("timeout", &self.inner.timeout)
            .finish_non_exhaustive()
    }
}
