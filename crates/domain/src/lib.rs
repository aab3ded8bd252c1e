//! Ledger Domain - Core business types
//!
//! This crate defines the domain model for the Ledger budget client.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod budget;
pub mod error;
pub mod request;
pub mod response;
pub mod route;

pub use auth::{AccessToken, Credentials, SessionState};
pub use error::{DomainError, DomainResult};
pub use request::{ApiRequest, HttpMethod};
pub use response::{ApiResponse, StatusCode};
pub use route::Route;
