//! Request specification type

use std::collections::BTreeMap;

use uuid::Uuid;

use super::{ApiBody, HttpMethod};
use crate::error::{DomainError, DomainResult};

/// Name of the header carrying the bearer credential.
pub const AUTHORIZATION: &str = "Authorization";

/// Complete specification for a call against the storefront backend.
///
/// Paths are relative to the configured base URL (e.g. `/book/all`).
/// A request is a plain value: replays clone it and attach a fresh
/// credential, the original is never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Unique identifier used to correlate log lines
    pub id: Uuid,
    /// HTTP method
    pub method: HttpMethod,
    /// Path relative to the API base URL
    pub path: String,
    /// Query parameters, in insertion order
    pub query: Vec<(String, String)>,
    /// Extra HTTP headers
    pub headers: BTreeMap<String, String>,
    /// Request body
    pub body: ApiBody,
}

impl ApiRequest {
    /// Creates a new request with no query, headers or body.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            method,
            path: path.into(),
            query: Vec::new(),
            headers: BTreeMap::new(),
            body: ApiBody::Empty,
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Creates a POST request.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// Creates a PATCH request.
    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    /// Creates a DELETE request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Sets a header, replacing any previous value with the same name.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_body(mut self, body: ApiBody) -> Self {
        self.body = body;
        self
    }

    /// Serializes `value` as the JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented as JSON.
    pub fn with_json<T: serde::Serialize>(self, value: &T) -> DomainResult<Self> {
        Ok(self.with_body(ApiBody::json(value)?))
    }

    /// Returns a copy of this request carrying `Authorization: Bearer <token>`.
    ///
    /// With `None` the copy is anonymous: any authorization header is removed.
    #[must_use]
    pub fn authorized(&self, access_token: Option<&str>) -> Self {
        let mut request = self.clone();
        match access_token {
            Some(token) => {
                request
                    .headers
                    .insert(AUTHORIZATION.to_string(), format!("Bearer {token}"));
            }
            None => {
                request.headers.remove(AUTHORIZATION);
            }
        }
        request
    }

    /// Returns the bearer token attached to this request, if any.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)
            .and_then(|value| value.strip_prefix("Bearer "))
    }

    /// Returns the path with the encoded query string appended.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be form-encoded.
    pub fn path_and_query(&self) -> DomainResult<String> {
        if self.query.is_empty() {
            return Ok(self.path.clone());
        }
        let encoded = serde_urlencoded::to_string(&self.query)
            .map_err(|e| DomainError::InvalidQuery(e.to_string()))?;
        Ok(format!("{}?{encoded}", self.path))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_path_and_query_encodes_values() {
        let request = ApiRequest::get("/book/search").with_query("query", "war & peace");
        assert_eq!(
            request.path_and_query().unwrap(),
            "/book/search?query=war+%26+peace"
        );
    }

    #[test]
    fn test_path_without_query() {
        let request = ApiRequest::get("/orders/all");
        assert_eq!(request.path_and_query().unwrap(), "/orders/all");
    }

    #[test]
    fn test_authorized_attaches_and_strips_bearer() {
        let request = ApiRequest::get("/auth/me");
        let signed = request.authorized(Some("A1"));
        assert_eq!(signed.bearer_token(), Some("A1"));
        assert_eq!(request.bearer_token(), None);

        let anonymous = signed.authorized(None);
        assert!(anonymous.headers.is_empty());
        assert_eq!(anonymous.id, request.id);
    }
}
