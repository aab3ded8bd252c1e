//! Assembles a [`Session`] from configuration.

use std::sync::Arc;

use ledger_application::ports::{LegacyCredentials, TransportError};
use ledger_application::{AuthRoutes, Session, SessionOptions};

use crate::adapters::ReqwestTransport;
use crate::config::ClientConfig;
use crate::legacy::LegacyTokenFile;

/// Builds the session over a reqwest transport.
///
/// # Errors
///
/// Returns an error if the transport cannot be created.
pub fn build_session(config: &ClientConfig) -> Result<Session, TransportError> {
    let transport = Arc::new(ReqwestTransport::new(config)?);
    Ok(Session::new(transport, session_options(config)))
}

/// Session options derived from configuration.
#[must_use]
pub fn session_options(config: &ClientConfig) -> SessionOptions {
    let legacy = config
        .legacy_token_path()
        .map(|path| Arc::new(LegacyTokenFile::new(path)) as Arc<dyn LegacyCredentials>);
    SessionOptions {
        routes: AuthRoutes::default(),
        refresh_timeout: config.refresh_timeout(),
        legacy,
    }
}
