//! Client configuration.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML
//! file, then `LEDGER_*` environment variables (`__` separates nested keys).

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Origin used when none is configured: the backend's development server.
pub const DEFAULT_ORIGIN: &str = "http://localhost:8000";

/// API base baked in at build time, or the same-origin `/api/` path.
pub const DEFAULT_API_BASE: &str = match option_env!("LEDGER_API_URL") {
    Some(base) => base,
    None => "/api/",
};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "LEDGER";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// The origin is not an absolute http(s) URL.
    #[error("invalid origin '{origin}': {reason}")]
    InvalidOrigin {
        /// Configured value.
        origin: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The API base cannot be resolved against the origin.
    #[error("invalid API base '{0}'")]
    InvalidApiBase(String),

    /// A timeout was set to zero.
    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Runtime configuration of the client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// Scheme, host and port of the site serving the API.
    pub origin: String,
    /// API base, absolute or relative to `origin`.
    pub api_base: String,
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Upper bound for a token refresh in milliseconds.
    pub refresh_timeout_ms: u64,
    /// `User-Agent` header value.
    pub user_agent: String,
    /// Log filter used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Where older versions stored the access token.
    #[serde(default)]
    pub legacy_token_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout_ms: 30_000,
            refresh_timeout_ms: 10_000,
            user_agent: format!("ledger/{}", env!("CARGO_PKG_VERSION")),
            log_filter: "info".to_string(),
            legacy_token_path: None,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from defaults, `file` and the process environment.
    ///
    /// A missing `file` is an error; without one, nothing is read from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if a source is malformed or validation fails.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(file, Self::environment())
    }

    /// Loads configuration with an explicit environment source.
    ///
    /// # Errors
    ///
    /// Returns an error if a source is malformed or validation fails.
    pub fn load_with(file: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("origin", defaults.origin)?
            .set_default("api_base", defaults.api_base)?
            .set_default("request_timeout_ms", defaults.request_timeout_ms)?
            .set_default("refresh_timeout_ms", defaults.refresh_timeout_ms)?
            .set_default("user_agent", defaults.user_agent)?
            .set_default("log_filter", defaults.log_filter)?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        let config: Self = builder.add_source(env).build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// The `LEDGER_*` environment source.
    #[must_use]
    pub fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
    }

    /// Checks the values that the type system cannot.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout("request_timeout_ms"));
        }
        if self.refresh_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout("refresh_timeout_ms"));
        }
        self.base_url().map(drop)
    }

    /// Resolves the API base against the origin.
    ///
    /// The result always ends with `/`, so relative paths join below it.
    ///
    /// # Errors
    ///
    /// Returns an error if the origin is not an absolute http(s) URL or the
    /// base cannot be joined onto it.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let invalid_origin = |reason: String| ConfigError::InvalidOrigin {
            origin: self.origin.clone(),
            reason,
        };
        let origin = Url::parse(&self.origin).map_err(|e| invalid_origin(e.to_string()))?;
        if !matches!(origin.scheme(), "http" | "https") {
            return Err(invalid_origin(format!(
                "unsupported scheme '{}'",
                origin.scheme()
            )));
        }

        let mut base = origin
            .join(&self.api_base)
            .map_err(|_| ConfigError::InvalidApiBase(self.api_base.clone()))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(base)
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Refresh timeout.
    #[must_use]
    pub const fn refresh_timeout(&self) -> Duration {
        Duration::from_millis(self.refresh_timeout_ms)
    }

    /// The legacy token file to purge, configured or under the user data dir.
    #[must_use]
    pub fn legacy_token_path(&self) -> Option<PathBuf> {
        self.legacy_token_path
            .clone()
            .or_else(crate::legacy::default_token_path)
    }
}
