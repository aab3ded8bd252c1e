//! Request/response middleware pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use ledger_domain::{ApiRequest, ApiResponse};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::ports::Transport;

/// Upper bound on replays of one logical request.
pub const MAX_REPLAYS: u8 = 1;

/// Rewrites an outgoing request before it reaches the transport.
pub trait RequestLayer: Send + Sync {
    /// Mutates the attempt about to be sent.
    fn on_request(&self, request: &mut ApiRequest);
}

/// What a [`ResponseLayer`] decided about a response.
#[derive(Debug)]
pub enum ResponseAction {
    /// Hand the response to the next layer, or to the caller.
    Pass(ApiResponse),
    /// Send the request again. `original` is returned to the caller if the
    /// pipeline refuses to replay.
    Replay {
        /// The response that triggered the replay.
        original: ApiResponse,
    },
}

/// Inspects a response and may ask for the request to be replayed.
#[async_trait]
pub trait ResponseLayer: Send + Sync {
    /// Handles the response to `request`.
    ///
    /// `request` is the logical request, not the attempt that was sent, so
    /// flags set here survive into the replay.
    async fn on_response(&self, request: &mut ApiRequest, response: ApiResponse) -> ResponseAction;
}

/// API client running every call through the configured layers.
///
/// Request layers run in insertion order on every attempt, including
/// replays. Response layers run in insertion order until one asks for a
/// replay.
#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    request_layers: Vec<Arc<dyn RequestLayer>>,
    response_layers: Vec<Arc<dyn ResponseLayer>>,
}

impl HttpClient {
    /// Creates a client with no layers.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            request_layers: Vec::new(),
            response_layers: Vec::new(),
        }
    }

    /// Appends a request layer.
    #[must_use]
    pub fn with_request_layer(mut self, layer: impl RequestLayer + 'static) -> Self {
        self.request_layers.push(Arc::new(layer));
        self
    }

    /// Appends a response layer.
    #[must_use]
    pub fn with_response_layer(mut self, layer: impl ResponseLayer + 'static) -> Self {
        self.response_layers.push(Arc::new(layer));
        self
    }

    /// Runs the request through the pipeline and returns the final response,
    /// whatever its status.
    ///
    /// # Errors
    ///
    /// Returns an error only when no response was received.
    pub async fn execute(&self, mut request: ApiRequest) -> ApiResult<ApiResponse> {
        let mut replays = 0u8;
        loop {
            let mut attempt = request.clone();
            for layer in &self.request_layers {
                layer.on_request(&mut attempt);
            }

            let response = self.transport.send(&attempt).await?;
            debug!(
                request_id = %request.id,
                method = %attempt.method,
                path = %attempt.path,
                status = response.status.as_u16(),
                duration_ms = u64::try_from(response.duration.as_millis()).unwrap_or(u64::MAX),
                "response received"
            );

            match self.run_response_layers(&mut request, response).await {
                ResponseAction::Pass(response) => return Ok(response),
                ResponseAction::Replay { original } => {
                    if replays >= MAX_REPLAYS || !request.is_retried() {
                        return Ok(original);
                    }
                    replays += 1;
                    debug!(request_id = %request.id, "replaying request");
                }
            }
        }
    }

    async fn run_response_layers(
        &self,
        request: &mut ApiRequest,
        mut response: ApiResponse,
    ) -> ResponseAction {
        for layer in &self.response_layers {
            match layer.on_response(request, response).await {
                ResponseAction::Pass(next) => response = next,
                replay @ ResponseAction::Replay { .. } => return replay,
            }
        }
        ResponseAction::Pass(response)
    }

    /// Runs the request and fails on any non-2xx final response.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] for a 401 that recovery could not
    /// fix, [`ApiError::Http`] for any other error status, or the transport
    /// failure.
    pub async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let response = self.execute(request).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(ApiError::from_response(&response))
        }
    }

    /// Runs the request and decodes a JSON body.
    ///
    /// # Errors
    ///
    /// Same as [`HttpClient::send`], plus [`ApiError::Decode`] if the body
    /// does not match `T`.
    pub async fn json<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        let response = self.send(request).await?;
        response
            .json_body()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("request_layers", &self.request_layers.len())
            .field("response_layers", &self.response_layers.len())
            .finish_non_exhaustive()
    }
}
