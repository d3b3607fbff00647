//! Request gateway for the service API
//!
//! Every outbound call goes through [`ServiceApi`]. Failures of any kind (network,
//! non-2xx status, undecodable body) come back as a single [`GatewayError`] whose
//! [`GatewayError::user_message`] is what the panel shows.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::model::{
    ConfigDocument, ControlOp, LogEntry, LogsResponse, SaveConfigRequest, ServiceStatus,
};

/// Message used when a failed response carries no body text
pub const GENERIC_FAILURE: &str = "Request failed";

/// Path of the server-sent events endpoint
pub const LOG_STREAM_PATH: &str = "/api/logs/stream";

/// Uniform failure shape for service calls
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Connection refused, DNS failure, reset mid-body, ...
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-2xx status
    #[error("service returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The push connection broke after it was established
    #[error("stream interrupted: {0}")]
    Io(#[from] std::io::Error),

    /// The body could not be decoded into the expected shape
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl GatewayError {
    /// Text shown to the operator
    ///
    /// For non-2xx responses this is the response body, or [`GENERIC_FAILURE`] if the
    /// body was empty.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } if !message.trim().is_empty() => message.trim().to_string(),
            Self::Status { .. } => GENERIC_FAILURE.to_string(),
            Self::Transport(e) => e.to_string(),
            Self::Io(e) => e.to_string(),
            Self::Decode(e) => format!("Unexpected response: {e}"),
        }
    }
}

/// Byte stream delivered by an open push connection
pub type ByteStream = BoxStream<'static, Result<Bytes, GatewayError>>;

/// Operations the panel needs from the service
#[async_trait]
pub trait ServiceApi: Send + Sync {
    async fn status(&self) -> Result<ServiceStatus, GatewayError>;
    async fn start(&self) -> Result<(), GatewayError>;
    async fn stop(&self) -> Result<(), GatewayError>;
    async fn reload(&self) -> Result<(), GatewayError>;
    async fn config(&self) -> Result<ConfigDocument, GatewayError>;
    async fn save_config(&self, content: &str, reload: bool) -> Result<(), GatewayError>;
    async fn logs(&self) -> Result<Vec<LogEntry>, GatewayError>;

    /// Dispatch a control operation to the matching call
    async fn control(&self, op: ControlOp) -> Result<(), GatewayError> {
        match op {
            ControlOp::Start => self.start().await,
            ControlOp::Stop => self.stop().await,
            ControlOp::Reload => self.reload().await,
        }
    }
}

/// Platform streaming primitive used by the live log channel
///
/// `connect` either fails or yields the raw body of the push connection; dropping the
/// stream closes the connection.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn connect(&self) -> Result<ByteStream, GatewayError>;
}

/// [`ServiceApi`] over HTTP/JSON
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    /// Create a gateway for `base_url` (a trailing `/` is ignored)
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send a request and turn non-2xx answers into [`GatewayError::Status`]
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, GatewayError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // Body text is the error message; a body we cannot read counts as empty
        let message = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), "service request failed");
        Err(GatewayError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        let response = self.send(self.client.get(self.url(path))).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// POST with an opaque response; the body is drained and ignored
    async fn post(&self, path: &str) -> Result<(), GatewayError> {
        let response = self.send(self.client.post(self.url(path))).await?;
        let _ = response.bytes().await?;
        Ok(())
    }
}

#[async_trait]
impl ServiceApi for HttpGateway {
    async fn status(&self) -> Result<ServiceStatus, GatewayError> {
        self.get_json("/api/status").await
    }

    async fn start(&self) -> Result<(), GatewayError> {
        self.post(ControlOp::Start.path()).await
    }

    async fn stop(&self) -> Result<(), GatewayError> {
        self.post(ControlOp::Stop.path()).await
    }

    async fn reload(&self) -> Result<(), GatewayError> {
        self.post(ControlOp::Reload.path()).await
    }

    async fn config(&self) -> Result<ConfigDocument, GatewayError> {
        self.get_json("/api/config").await
    }

    async fn save_config(&self, content: &str, reload: bool) -> Result<(), GatewayError> {
        let request = self
            .client
            .put(self.url("/api/config"))
            .json(&SaveConfigRequest { content, reload });
        let response = self.send(request).await?;
        let _ = response.bytes().await?;
        Ok(())
    }

    async fn logs(&self) -> Result<Vec<LogEntry>, GatewayError> {
        let response: LogsResponse = self.get_json("/api/logs").await?;
        Ok(response.entries)
    }
}

#[async_trait]
impl EventSource for HttpGateway {
    async fn connect(&self) -> Result<ByteStream, GatewayError> {
        let request = self
            .client
            .get(self.url(LOG_STREAM_PATH))
            .header(reqwest::header::ACCEPT, "text/event-stream");
        let response = self.send(request).await?;
        debug!(url = %self.url(LOG_STREAM_PATH), "log stream connected");
        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(GatewayError::from))
            .boxed())
    }
}
