//! HTTP client with a middleware pipeline.
//!
//! Every non-auth API call goes through [`HttpClient`]. The session wires in
//! [`BearerAuth`] to authorize requests and [`Reauthenticate`] to recover
//! from an expired access token.

mod layers;
mod pipeline;

pub use layers::{BearerAuth, Reauthenticate};
pub use pipeline::{HttpClient, MAX_REPLAYS, RequestLayer, ResponseAction, ResponseLayer};
