//! HTTP transport port

use async_trait::async_trait;
use bookverse_domain::{ApiRequest, ApiResponse};
use thiserror::Error;

/// Errors raised before a response status could be observed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request timed out.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout {
        /// Timeout that elapsed
        timeout_ms: u64,
    },

    /// The connection could not be established.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The target URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The request body could not be encoded.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

/// Port for sending requests to the storefront backend.
///
/// Implementations only move bytes: they never attach credentials and never
/// interpret status codes. Both are the pipeline's job.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends `request` and returns the raw response, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns an error if no response was received.
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

impl std::fmt::Debug for dyn HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("HttpTransport")
    }
}
