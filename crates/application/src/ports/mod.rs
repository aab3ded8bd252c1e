//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod legacy_credentials;
mod transport;

pub use legacy_credentials::LegacyCredentials;
pub use transport::{Transport, TransportError};
