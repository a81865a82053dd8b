//! HTTP transport implementation using reqwest.
//!
//! This adapter implements the `HttpTransport` port. It resolves request
//! paths against the configured API root and returns every response as-is,
//! whatever its status.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bookverse_application::ports::{HttpTransport, TransportError};
use bookverse_domain::{ApiRequest, ApiResponse, HttpMethod};
use reqwest::{Client, Method, Url};

use crate::config::ClientConfig;
use crate::http::{BuiltBody, build_body};

const MAX_REDIRECTS: usize = 10;

/// HTTP transport backed by `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Creates a transport from the client configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the client cannot be
    /// created.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let base_url = config
            .base_url()
            .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self::with_client(client, base_url, config.request_timeout()))
    }

    /// Creates a transport around an existing reqwest client.
    #[must_use]
    pub const fn with_client(client: Client, base_url: Url, timeout: Duration) -> Self {
        Self {
            client,
            base_url,
            timeout,
        }
    }

    /// API root every request path is appended to.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Resolves a request against the API root.
    ///
    /// Paths are appended, not joined, so `/book/all` under
    /// `https://host/api/v1` stays below `/api/v1`.
    fn url_for(&self, request: &ApiRequest) -> Result<Url, TransportError> {
        let path_and_query = request
            .path_and_query()
            .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
        let base = self.base_url.as_str().trim_end_matches('/');
        let separator = if path_and_query.starts_with('/') { "" } else { "/" };
        let raw = format!("{base}{separator}{path_and_query}");
        Url::parse(&raw).map_err(|e| TransportError::InvalidUrl(format!("{e}: {raw}")))
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout { timeout_ms };
        }

        if error.is_connect() {
            let host = error
                .url()
                .and_then(Url::host_str)
                .unwrap_or("unknown")
                .to_string();
            return TransportError::ConnectionFailed(format!("{host}: {error}"));
        }

        if error.is_redirect() {
            return TransportError::Other(format!("too many redirects (max {MAX_REDIRECTS})"));
        }

        TransportError::Other(error.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.url_for(request)?;
        let timeout_ms = self.timeout_ms();

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url)
            .timeout(self.timeout);

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let body = build_body(&request.body).map_err(|e| TransportError::InvalidBody(e.to_string()))?;
        if let Some(content_type) = body.content_type() {
            let has_content_type = request
                .headers
                .keys()
                .any(|name| name.eq_ignore_ascii_case("content-type"));
            if !has_content_type {
                builder = builder.header("Content-Type", content_type);
            }
        }
        builder = match body {
            BuiltBody::None => builder,
            BuiltBody::Text { content, .. } => builder.body(content),
            BuiltBody::Multipart(form) => builder.multipart(form),
        };

        let start = Instant::now();
        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(&e, timeout_ms))?;
        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::Other(format!("Failed to read body: {e}")))?;
        let duration = start.elapsed();

        tracing::debug!(
            request_id = %request.id,
            method = %request.method,
            path = %request.path,
            status,
            elapsed_ms = duration.as_millis(),
            "Request completed"
        );

        Ok(ApiResponse {
            status,
            body: bytes.to_vec(),
            duration,
        })
    }
}
