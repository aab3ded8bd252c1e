//! Tracing subscriber setup.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over `fallback` when set and valid.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(fallback: &str) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(filter(fallback))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
}

fn filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
