//! Assistant-backed book recommendations.

use bookverse_domain::{ApiRequest, DomainError};
use serde::Serialize;

use crate::error::ApiResult;
use crate::pipeline::AuthenticatedClient;

/// Reply used when the assistant has nothing to say.
pub const NO_RECOMMENDATIONS: &str = "Sorry, I couldn't find any recommendations.";

#[derive(Serialize)]
struct RecommendQuery<'a> {
    text: &'a str,
}

/// Calls against the `/recommend` endpoints.
#[derive(Debug, Clone)]
pub struct RecommendApi {
    client: AuthenticatedClient,
}

impl RecommendApi {
    /// Creates the API on top of a pipeline.
    #[must_use]
    pub const fn new(client: AuthenticatedClient) -> Self {
        Self { client }
    }

    /// Asks the assistant for books matching a free-text description.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is blank or the call fails.
    pub async fn search(&self, text: &str) -> ApiResult<String> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DomainError::MissingField("text").into());
        }
        let request = ApiRequest::post("/recommend/search").with_json(&RecommendQuery { text })?;
        let reply: Option<String> = self.client.get_optional_data(&request).await?;
        Ok(reply
            .filter(|reply| !reply.trim().is_empty())
            .unwrap_or_else(|| NO_RECOMMENDATIONS.to_string()))
    }
}
