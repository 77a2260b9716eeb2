//! Host transport
//!
//! Commands reach the device through the print server's plugin command
//! endpoint. The core only needs "post this payload, tell me whether it
//! worked and what the error body was"; the trait keeps the HTTP client
//! swappable for tests and other hosts.

use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use swapper3d_core::{PanelError, PanelResult};

use crate::command::{CommandPayload, CommandRequest};

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
const API_KEY_HEADER: &str = "X-Api-Key";

/// Transport-level failures
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("request failed: status={status} body={body}")]
    Status { status: u16, body: String },
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("payload encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Text to surface in the activity log
    ///
    /// For rejected requests this is the response body exactly as received.
    pub fn body(&self) -> String {
        match self {
            TransportError::Status { body, .. } => body.clone(),
            TransportError::Other(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Anything that can deliver a command payload to the host plugin
#[async_trait]
pub trait CommandTransport: Send + Sync {
    /// Post one command; `Ok` carries the decoded response body
    async fn post_command(&self, payload: &CommandPayload)
        -> Result<serde_json::Value, TransportError>;
}

/// Send `request` and translate transport errors into the panel taxonomy
pub(crate) async fn transmit(
    transport: &dyn CommandTransport,
    request: &CommandRequest,
) -> PanelResult<serde_json::Value> {
    tracing::debug!(command = %request, "transmitting");
    transport
        .post_command(&request.payload())
        .await
        .map_err(|e| {
            tracing::error!(command = %request, "transport failure: {}", e);
            PanelError::TransportFailure {
                command: request.command().wire_name().to_string(),
                body: e.body(),
            }
        })
}

/// Settings for [`HttpTransport`]
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Print server root, e.g. `http://octopi.local`
    pub base_url: String,
    /// Path of the plugin command endpoint
    pub command_path: String,
    /// Sent as `X-Api-Key` when present
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl HttpTransportConfig {
    /// Endpoint path for a plugin identifier
    pub fn command_path_for(plugin_id: &str) -> String {
        format!("/plugin/{}/command", plugin_id)
    }
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            command_path: Self::command_path_for("Swapper3D"),
            api_key: None,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Posts commands to the host over HTTP
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
    api_key: Option<HeaderValue>,
}

impl HttpTransport {
    pub fn new(config: &HttpTransportConfig) -> Result<Self, TransportError> {
        let endpoint = Url::parse(&config.base_url)
            .and_then(|base| base.join(&config.command_path))
            .map_err(|e| {
                TransportError::InvalidEndpoint(format!(
                    "{}{}: {}",
                    config.base_url, config.command_path, e
                ))
            })?;

        let api_key = config
            .api_key
            .as_deref()
            .map(HeaderValue::from_str)
            .transpose()
            .map_err(|e| TransportError::Other(format!("invalid API key: {}", e)))?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl CommandTransport for HttpTransport {
    async fn post_command(
        &self,
        payload: &CommandPayload,
    ) -> Result<serde_json::Value, TransportError> {
        let body = serde_json::to_vec(payload)?;

        let mut request = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(body);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key.clone());
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        // Body is informational only; keep unparseable text rather than fail
        Ok(serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text)))
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "<set>"))
            .finish()
    }
}
