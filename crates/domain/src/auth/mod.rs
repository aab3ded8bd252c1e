//! Authentication domain types

mod session;
mod token;

pub use session::SessionState;
pub use token::{AccessToken, Credentials};
