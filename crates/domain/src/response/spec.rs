//! Response specification type

use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Message shown when the backend rejects a call without explaining why.
pub const DEFAULT_ERROR_MESSAGE: &str = "An error occurred";

/// Raw HTTP response as received from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body bytes
    pub body: Vec<u8>,
    /// Response time
    pub duration: Duration,
}

impl ApiResponse {
    /// Creates a response with the given status and body.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            duration: Duration::ZERO,
        }
    }

    /// Creates a response whose body is the given JSON value.
    #[must_use]
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self::new(status, value.to_string())
    }

    /// Returns true if the status code indicates success (2xx).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns true if the backend rejected the credential (401).
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON for `T`.
    pub fn json_body<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Parses the body as the backend's `{data, message}` envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not a valid envelope for `T`.
    pub fn envelope<T: DeserializeOwned>(&self) -> Result<Envelope<T>, serde_json::Error> {
        self.json_body()
    }

    /// Returns the error message carried by a failed response.
    ///
    /// Falls back to [`DEFAULT_ERROR_MESSAGE`] when the body has none.
    #[must_use]
    pub fn error_message(&self) -> String {
        self.json_body::<Envelope<serde_json::Value>>()
            .ok()
            .and_then(|envelope| envelope.message)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string())
    }
}

/// Wrapper every backend response body uses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Envelope<T> {
    /// Payload, absent on errors and some mutations
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    /// Human-readable status or error message
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_status_checks() {
        assert!(ApiResponse::new(200, "").is_success());
        assert!(!ApiResponse::new(404, "").is_success());
        assert!(ApiResponse::new(401, "").is_unauthorized());
        assert!(!ApiResponse::new(403, "").is_unauthorized());
    }

    #[test]
    fn test_error_message_from_body() {
        let response = ApiResponse::json(400, &json!({"message": "Out of stock"}));
        assert_eq!(response.error_message(), "Out of stock");
    }

    #[test]
    fn test_error_message_fallback() {
        assert_eq!(
            ApiResponse::new(500, "<html>").error_message(),
            DEFAULT_ERROR_MESSAGE
        );
        assert_eq!(
            ApiResponse::json(500, &json!({"message": ""})).error_message(),
            DEFAULT_ERROR_MESSAGE
        );
    }

    #[test]
    fn test_envelope_without_data() {
        let response = ApiResponse::json(200, &json!({"message": "ok"}));
        let envelope: Envelope<String> = response.envelope().unwrap_or(Envelope {
            data: Some("unexpected".into()),
            message: None,
        });
        assert_eq!(envelope.data, None);
        assert_eq!(envelope.message.as_deref(), Some("ok"));
    }
}
