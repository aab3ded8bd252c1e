//! Startup session restoration.

use std::sync::Arc;

use ledger_domain::SessionState;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::auth::{RefreshCoordinator, TokenStore};
use crate::ports::LegacyCredentials;

/// Restores a session from the refresh cookie, once.
///
/// The first call to [`BootstrapSession::run`] does the work; concurrent and
/// later calls wait for and return that first outcome.
pub struct BootstrapSession {
    tokens: TokenStore,
    refresher: RefreshCoordinator,
    legacy: Option<Arc<dyn LegacyCredentials>>,
    outcome: OnceCell<SessionState>,
}

impl BootstrapSession {
    /// Creates the bootstrap step.
    #[must_use]
    pub fn new(
        tokens: TokenStore,
        refresher: RefreshCoordinator,
        legacy: Option<Arc<dyn LegacyCredentials>>,
    ) -> Self {
        Self {
            tokens,
            refresher,
            legacy,
            outcome: OnceCell::new(),
        }
    }

    /// Runs bootstrap, or waits for the run already under way.
    ///
    /// Returns [`SessionState::Authenticated`] if a token was already held or
    /// the silent refresh succeeded, [`SessionState::Anonymous`] otherwise.
    pub async fn run(&self) -> SessionState {
        *self.outcome.get_or_init(|| self.restore()).await
    }

    async fn restore(&self) -> SessionState {
        self.purge_legacy();

        if self.tokens.is_authenticated() {
            debug!("access token already held, skipping silent refresh");
            return SessionState::Authenticated;
        }

        match self.refresher.refresh().await {
            Some(_) => {
                info!("session restored from refresh cookie");
                SessionState::Authenticated
            }
            None => {
                info!("no session to restore, starting anonymous");
                SessionState::Anonymous
            }
        }
    }

    fn purge_legacy(&self) {
        let Some(legacy) = &self.legacy else {
            return;
        };
        match legacy.purge() {
            Ok(true) => info!("removed access token left on disk by an older version"),
            Ok(false) => {}
            Err(err) => warn!(error = %err, "failed to remove legacy access token"),
        }
    }

    /// Returns true once the first run has finished.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.outcome.initialized()
    }

    /// Returns the outcome of the first run, if it has finished.
    #[must_use]
    pub fn outcome(&self) -> Option<SessionState> {
        self.outcome.get().copied()
    }
}

impl std::fmt::Debug for BootstrapSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapSession")
            .field("outcome", &self.outcome())
            .finish_non_exhaustive()
    }
}
