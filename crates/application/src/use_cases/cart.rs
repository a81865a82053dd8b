//! Server-side cart.

use bookverse_domain::{ApiRequest, DomainError, OrderLine};

use crate::error::ApiResult;
use crate::pipeline::AuthenticatedClient;

/// Calls against the `/cart` endpoints.
#[derive(Debug, Clone)]
pub struct CartApi {
    client: AuthenticatedClient,
}

impl CartApi {
    /// Creates the API on top of a pipeline.
    #[must_use]
    pub const fn new(client: AuthenticatedClient) -> Self {
        Self { client }
    }

    /// Adds units of a book to the user's remote cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is invalid or the call fails.
    pub async fn add(&self, book_id: &str, quantity: u32) -> ApiResult<()> {
        let book_id = book_id.trim();
        if book_id.is_empty() {
            return Err(DomainError::InvalidIdentifier(book_id.to_string()).into());
        }
        if quantity == 0 {
            return Err(DomainError::InvalidNumber {
                field: "quantity",
                value: quantity.to_string(),
            }
            .into());
        }
        let request = ApiRequest::post("/cart/add").with_json(&OrderLine {
            book_id: book_id.to_string(),
            quantity,
        })?;
        self.client.execute(&request).await
    }
}
