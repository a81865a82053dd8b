//! Application error types

use bookverse_domain::DomainError;
use thiserror::Error;

use crate::ports::TransportError;

/// Reasons a credential renewal can fail.
///
/// Every caller waiting on the same renewal receives a clone of the error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenewalError {
    /// No refresh token is stored; nothing to exchange.
    #[error("no refresh token available")]
    NoRefreshToken,

    /// The backend refused the refresh token.
    #[error("refresh rejected ({status}): {message}")]
    Rejected {
        /// HTTP status of the exchange
        status: u16,
        /// Message carried by the response
        message: String,
    },

    /// The exchange succeeded but carried no access token.
    #[error("renewal response carried no access token")]
    MissingAccessToken,

    /// The exchange never produced a response.
    #[error("renewal transport failure: {0}")]
    Transport(TransportError),

    /// The exchange did not complete in time.
    #[error("renewal timed out after {timeout_ms}ms")]
    TimedOut {
        /// Timeout that elapsed
        timeout_ms: u64,
    },

    /// The renewal was dropped before it settled.
    #[error("renewal abandoned before completion")]
    Abandoned,
}

/// Errors surfaced to callers of the storefront API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend requires a signed-in user and none is present.
    #[error("not signed in")]
    Unauthenticated,

    /// The backend rejected a freshly renewed credential.
    #[error("not authorized")]
    Unauthorized,

    /// Renewal failed; the session was cleared.
    #[error("session expired: {0}")]
    SessionExpired(#[from] RenewalError),

    /// No response was received.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The backend answered with a non-success status.
    #[error("{message} ({status})")]
    Status {
        /// HTTP status code
        status: u16,
        /// Message carried by the response
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// Input was rejected before any call was made.
    #[error("{0}")]
    Validation(#[from] DomainError),
}

impl ApiError {
    /// Returns the HTTP status behind this error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Unauthenticated | Self::Unauthorized => Some(401),
            _ => None,
        }
    }

    /// Returns true if the user has to sign in again.
    ///
    /// An abandoned renewal decided nothing, so the session it left behind
    /// is still usable.
    #[must_use]
    pub const fn requires_sign_in(&self) -> bool {
        match self {
            Self::Unauthenticated => true,
            Self::SessionExpired(error) => !matches!(error, RenewalError::Abandoned),
            _ => false,
        }
    }
}

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
