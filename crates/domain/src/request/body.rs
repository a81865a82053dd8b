//! HTTP Request body types

use serde::Serialize;

use crate::error::{DomainError, DomainResult};

/// Body of an outgoing API request.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ApiBody {
    /// No body
    #[default]
    Empty,
    /// JSON document
    Json(serde_json::Value),
    /// Multipart form data (book create/update with an optional cover image)
    Multipart(Vec<FormPart>),
}

impl ApiBody {
    /// Serializes `value` into a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented as JSON.
    pub fn json<T: Serialize>(value: &T) -> DomainResult<Self> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(|e| DomainError::InvalidBody(e.to_string()))
    }

    /// Returns whether the body is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns the content type if applicable.
    ///
    /// Multipart bodies return `None`: the boundary is chosen by the transport.
    #[must_use]
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::Json(_) => Some("application/json"),
            Self::Empty | Self::Multipart(_) => None,
        }
    }
}

/// A single named part of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    /// Form field name
    pub name: String,
    /// Field content
    pub value: PartValue,
}

/// Content of a multipart form part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartValue {
    /// Plain text field
    Text(String),
    /// Uploaded file
    File {
        /// Original file name
        file_name: String,
        /// Explicit content type; guessed from the file name when absent
        content_type: Option<String>,
        /// Raw file bytes
        bytes: Vec<u8>,
    },
}

impl FormPart {
    /// Creates a text field.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: PartValue::Text(value.into()),
        }
    }

    /// Creates a file field.
    #[must_use]
    pub fn file(name: impl Into<String>, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            value: PartValue::File {
                file_name: file_name.into(),
                content_type: None,
                bytes,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_body() {
        let body = ApiBody::json(&json!({"key": "value"})).unwrap_or_default();
        assert_eq!(body.content_type(), Some("application/json"));
        assert!(!body.is_empty());
    }

    #[test]
    fn test_empty_body() {
        let body = ApiBody::Empty;
        assert!(body.is_empty());
        assert_eq!(body.content_type(), None);
    }

    #[test]
    fn test_multipart_has_no_fixed_content_type() {
        let body = ApiBody::Multipart(vec![FormPart::text("title", "Dune")]);
        assert_eq!(body.content_type(), None);
    }
}
