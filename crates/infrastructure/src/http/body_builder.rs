//! HTTP request body builder.
//!
//! Turns the domain [`ApiBody`] into something reqwest can send.

use bookverse_domain::{ApiBody, FormPart, PartValue};
use reqwest::multipart::{Form, Part};

/// Error type for body building operations.
#[derive(Debug, thiserror::Error)]
pub enum BodyBuildError {
    /// Invalid body configuration.
    #[error("Invalid body configuration: {message}")]
    InvalidConfig {
        /// What was wrong
        message: String,
    },

    /// Serialization error.
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Underlying error
        message: String,
    },
}

/// Result of building a body.
#[derive(Debug)]
pub enum BuiltBody {
    /// No body.
    None,
    /// Text/JSON body with content type.
    Text {
        /// Encoded body
        content: String,
        /// Value of the `Content-Type` header
        content_type: String,
    },
    /// Multipart form data.
    Multipart(Form),
}

/// Builds an HTTP body from the domain body.
///
/// # Errors
///
/// Returns an error if JSON encoding fails or a file part carries an
/// invalid MIME type.
pub fn build_body(body: &ApiBody) -> Result<BuiltBody, BodyBuildError> {
    match body {
        ApiBody::Empty => Ok(BuiltBody::None),

        ApiBody::Json(value) => {
            let content =
                serde_json::to_string(value).map_err(|e| BodyBuildError::SerializationError {
                    message: e.to_string(),
                })?;
            Ok(BuiltBody::Text {
                content,
                content_type: mime::APPLICATION_JSON.to_string(),
            })
        }

        ApiBody::Multipart(parts) => build_multipart_form(parts).map(BuiltBody::Multipart),
    }
}

/// Build a multipart form from form parts.
fn build_multipart_form(parts: &[FormPart]) -> Result<Form, BodyBuildError> {
    let mut form = Form::new();

    for field in parts {
        match &field.value {
            PartValue::Text(value) => {
                form = form.text(field.name.clone(), value.clone());
            }
            PartValue::File {
                file_name,
                content_type,
                bytes,
            } => {
                let mime_type = content_type.clone().unwrap_or_else(|| {
                    mime_guess::from_path(file_name)
                        .first_or_octet_stream()
                        .to_string()
                });

                let part = Part::bytes(bytes.clone())
                    .file_name(file_name.clone())
                    .mime_str(&mime_type)
                    .map_err(|e| BodyBuildError::InvalidConfig {
                        message: format!("Invalid MIME type: {e}"),
                    })?;

                form = form.part(field.name.clone(), part);
            }
        }
    }

    Ok(form)
}

impl BuiltBody {
    /// Get the Content-Type header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        match self {
            Self::Text { content_type, .. } => Some(content_type),
            // reqwest sets this itself, with the boundary
            Self::None | Self::Multipart(_) => None,
        }
    }

    /// Check if this is a multipart form.
    #[must_use]
    pub const fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart(_))
    }
}
