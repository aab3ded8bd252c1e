//! Transport implementation using reqwest.
//!
//! Paths are resolved against the configured API base. The underlying
//! client keeps a cookie jar, which is where the HttpOnly refresh cookie
//! set by the login endpoint lives between calls.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use ledger_application::ports::{Transport, TransportError};
use ledger_domain::{ApiRequest, ApiResponse, HttpMethod};
use reqwest::{Client, Method, Url};

use crate::config::ClientConfig;

/// reqwest-backed [`Transport`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base: Url,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Creates a transport for the configured API.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the client cannot be
    /// built.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let base = config
            .base_url()
            .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .cookie_store(true)
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self {
            client,
            base,
            timeout: config.request_timeout(),
        })
    }

    /// Creates a transport around an existing client.
    ///
    /// The client should have a cookie store enabled.
    #[must_use]
    pub const fn with_client(client: Client, base: Url, timeout: Duration) -> Self {
        Self {
            client,
            base,
            timeout,
        }
    }

    /// The API base every path is resolved against.
    #[must_use]
    pub const fn base(&self) -> &Url {
        &self.base
    }

    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Resolves the request path and query against the API base.
    fn url(&self, request: &ApiRequest) -> Result<Url, TransportError> {
        let mut url = self
            .base
            .join(&request.path)
            .map_err(|e| TransportError::InvalidUrl(format!("{e}: {}", request.path)))?;
        if !request.query.is_empty() {
            let query = serde_urlencoded::to_string(&request.query)
                .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
            url.set_query(Some(&query));
        }
        Ok(url)
    }

    fn map_error(&self, error: &reqwest::Error) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout {
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            };
        }
        if error.is_connect() {
            return TransportError::Connect(error.to_string());
        }
        TransportError::Other(error.to_string())
    }
}

impl Transport for ReqwestTransport {
    fn send<'a>(
        &'a self,
        request: &'a ApiRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + Send + 'a>> {
        Box::pin(async move {
            let url = self.url(request)?;
            let start = Instant::now();

            let mut builder = self
                .client
                .request(Self::to_reqwest_method(request.method), url)
                .header("Accept", "application/json");
            for header in request.headers.iter() {
                builder = builder.header(&header.name, &header.value);
            }
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            let response = builder.send().await.map_err(|e| self.map_error(&e))?;
            let status = response.status().as_u16();
            let headers: HashMap<String, String> = response
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
                .collect();
            let body = response
                .bytes()
                .await
                .map_err(|e| self.map_error(&e))?
                .to_vec();

            Ok(ApiResponse::new(status, headers, body, start.elapsed()))
        })
    }
}
