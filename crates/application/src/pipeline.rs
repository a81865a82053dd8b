//! Authenticated request pipeline.
//!
//! Every call goes out with the current access token attached. A first
//! attempt that comes back 401 is handed to the [`RefreshCoordinator`] and
//! replayed once with the renewed token; a replay is never renewed again.

use std::sync::Arc;
use std::time::Duration;

use bookverse_domain::{ApiRequest, ApiResponse};
use serde::de::DeserializeOwned;

use crate::auth::{RefreshCoordinator, SessionLifecycle, TokenStore};
use crate::error::{ApiError, ApiResult};
use crate::ports::{HttpTransport, KeyValueStorage, TransportError};

/// Which dispatch of a logical call this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    /// First dispatch with the stored token.
    Initial,
    /// Single replay after a renewal.
    Replay,
}

impl Attempt {
    /// Returns true if a 401 on this attempt may trigger a renewal.
    #[must_use]
    pub const fn may_renew(self) -> bool {
        matches!(self, Self::Initial)
    }
}

/// Outcome of sending a request through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    /// Final response
    pub response: ApiResponse,
    /// Attempt that produced the response
    pub attempt: Attempt,
}

impl Dispatch {
    /// Returns the response if it succeeded.
    ///
    /// # Errors
    ///
    /// Maps a 401 that survived renewal to [`ApiError::Unauthorized`] and
    /// any other failure status to [`ApiError::Status`].
    pub fn success(self) -> ApiResult<ApiResponse> {
        if self.response.is_success() {
            return Ok(self.response);
        }
        if self.response.is_unauthorized() {
            return Err(ApiError::Unauthorized);
        }
        Err(status_error(&self.response))
    }
}

fn status_error(response: &ApiResponse) -> ApiError {
    ApiError::Status {
        status: response.status,
        message: response.error_message(),
    }
}

fn decode_data<T: DeserializeOwned>(response: &ApiResponse) -> ApiResult<Option<T>> {
    if response.body.is_empty() {
        return Ok(None);
    }
    response
        .envelope::<T>()
        .map(|envelope| envelope.data)
        .map_err(|e| ApiError::Decode(e.to_string()))
}

/// HTTP client that attaches credentials and renews them on demand.
#[derive(Debug, Clone)]
pub struct AuthenticatedClient {
    transport: Arc<dyn HttpTransport>,
    tokens: TokenStore,
    lifecycle: Arc<SessionLifecycle>,
    coordinator: Arc<RefreshCoordinator>,
}

impl AuthenticatedClient {
    /// Wires a pipeline, its coordinator and lifecycle around one transport
    /// and one storage.
    #[must_use]
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        storage: Arc<dyn KeyValueStorage>,
        renewal_timeout: Duration,
    ) -> Self {
        let tokens = TokenStore::new(storage);
        let lifecycle = Arc::new(SessionLifecycle::new(tokens.clone()));
        let coordinator = Arc::new(
            RefreshCoordinator::new(transport.clone(), tokens.clone(), lifecycle.clone())
                .with_timeout(renewal_timeout),
        );
        Self {
            transport,
            tokens,
            lifecycle,
            coordinator,
        }
    }

    /// Token store shared with the coordinator.
    #[must_use]
    pub const fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Session lifecycle hosts subscribe to.
    #[must_use]
    pub const fn lifecycle(&self) -> &Arc<SessionLifecycle> {
        &self.lifecycle
    }

    /// Renewal coordinator shared by every clone of this client.
    #[must_use]
    pub const fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        access_token: Option<&str>,
        attempt: Attempt,
    ) -> Result<Dispatch, TransportError> {
        let outgoing = request.authorized(access_token);
        let response = self.transport.send(&outgoing).await?;
        tracing::debug!(
            id = %request.id,
            method = %request.method,
            path = %request.path,
            status = response.status,
            ?attempt,
            "Response received"
        );
        Ok(Dispatch { response, attempt })
    }

    /// Sends a request with the stored credential, renewing it once on 401.
    ///
    /// Non-401 responses are returned unchanged whatever their status. An
    /// anonymous call is renewed like any other, so with nothing stored it
    /// ends in [`RenewalError::NoRefreshToken`](crate::RenewalError::NoRefreshToken).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if no response was received and
    /// [`ApiError::SessionExpired`] if the credential could not be renewed.
    pub async fn send(&self, request: &ApiRequest) -> ApiResult<Dispatch> {
        let used = self.tokens.access_token();
        let first = self
            .dispatch(request, used.as_deref(), Attempt::Initial)
            .await?;
        if !first.response.is_unauthorized() || !first.attempt.may_renew() {
            return Ok(first);
        }

        // Another caller may have renewed while this one was in flight.
        let token = match self.tokens.access_token() {
            Some(current) if used.as_deref() != Some(current.as_str()) => {
                tracing::debug!(id = %request.id, "Replaying with already renewed token");
                current
            }
            _ => self.coordinator.renew().await?,
        };

        Ok(self.dispatch(request, Some(&token), Attempt::Replay).await?)
    }

    /// Sends a request and decodes the `data` field of the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the body has no usable data.
    pub async fn get_data<T: DeserializeOwned>(&self, request: &ApiRequest) -> ApiResult<T> {
        self.get_optional_data(request)
            .await?
            .ok_or_else(|| ApiError::Decode("response carried no data".to_string()))
    }

    /// Like [`Self::get_data`], but a missing `data` field is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the body is malformed.
    pub async fn get_optional_data<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
    ) -> ApiResult<Option<T>> {
        let response = self.send(request).await?.success()?;
        decode_data(&response)
    }

    /// Sends a request whose response body is not needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn execute(&self, request: &ApiRequest) -> ApiResult<()> {
        self.send(request).await?.success()?;
        Ok(())
    }

    /// Sends a request without any credential and without renewal.
    ///
    /// Used for the sign-in and registration calls, where a 401 carries a
    /// message for the user rather than an expired session.
    ///
    /// # Errors
    ///
    /// Returns an error if no response was received or its status is not 2xx.
    pub async fn send_public(&self, request: &ApiRequest) -> ApiResult<ApiResponse> {
        let dispatch = self.dispatch(request, None, Attempt::Initial).await?;
        if !dispatch.response.is_success() {
            return Err(status_error(&dispatch.response));
        }
        Ok(dispatch.response)
    }

    /// Sends an anonymous request and decodes the `data` field.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the body has no usable data.
    pub async fn public_data<T: DeserializeOwned>(&self, request: &ApiRequest) -> ApiResult<T> {
        let response = self.send_public(request).await?;
        decode_data(&response)?
            .ok_or_else(|| ApiError::Decode("response carried no data".to_string()))
    }
}
