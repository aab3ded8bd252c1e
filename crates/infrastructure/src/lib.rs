//! Ledger Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus configuration and logging setup.

pub mod adapters;
pub mod config;
pub mod legacy;
pub mod logging;
pub mod wiring;

pub use adapters::ReqwestTransport;
pub use config::{ClientConfig, ConfigError};
pub use legacy::LegacyTokenFile;
pub use logging::init_logging;
pub use wiring::{build_session, session_options};
