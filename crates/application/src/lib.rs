//! Ledger Application - Session lifecycle and API access
//!
//! This crate defines the application layer with:
//! - Port traits (transport, legacy credential storage)
//! - Access token storage and coalesced refresh
//! - The intercepted HTTP client and its authorization layers
//! - Session bootstrap and route gating
//! - Typed clients for the budget collections

pub mod auth;
pub mod error;
pub mod http;
pub mod ports;
pub mod services;
pub mod session;

pub use auth::{AuthApi, AuthRoutes, RefreshCoordinator, TokenStore, TransportAuthApi};
pub use error::{ApiError, ApiResult};
pub use http::HttpClient;
pub use ports::{LegacyCredentials, Transport, TransportError};
pub use services::{AccountApi, BudgetApi, ResourceApi};
pub use session::{AuthGate, BootstrapSession, GateDecision, Session, SessionOptions};
