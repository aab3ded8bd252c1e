//! Session credentials for the Ledger API client.
//!
//! This module provides:
//! - In-memory access token storage
//! - The authentication endpoint port and its transport-backed implementation
//! - Single-flight coordination of token refreshes

mod api;
mod refresh;
mod single_flight;
mod token_store;

pub use api::{AuthApi, AuthRoutes, TransportAuthApi};
pub use refresh::{DEFAULT_REFRESH_TIMEOUT, RefreshCoordinator};
pub use single_flight::{FlightHandle, Joined, SingleFlight};
pub use token_store::{Generation, TokenStore};
