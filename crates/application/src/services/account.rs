//! Account management.

use ledger_domain::{ApiRequest, Credentials};

use crate::error::ApiResult;
use crate::http::HttpClient;

/// Path of the account creation endpoint.
pub const SIGNUP_PATH: &str = "signup/";

/// Account endpoints that are not part of the token lifecycle.
#[derive(Debug, Clone)]
pub struct AccountApi {
    client: HttpClient,
}

impl AccountApi {
    /// Creates the client.
    #[must_use]
    pub const fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Creates an account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns the API error, e.g. a 400 when the username is taken.
    pub async fn signup(&self, credentials: &Credentials) -> ApiResult<serde_json::Value> {
        self.client
            .json(ApiRequest::post(SIGNUP_PATH, credentials)?)
            .await
    }
}
