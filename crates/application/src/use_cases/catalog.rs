//! Book catalog browsing and administration.

use bookverse_domain::{ApiBody, ApiRequest, Book, BookDraft, DomainError, HttpMethod};

use crate::error::ApiResult;
use crate::pipeline::AuthenticatedClient;

/// Calls against the `/book` endpoints.
#[derive(Debug, Clone)]
pub struct BooksApi {
    client: AuthenticatedClient,
}

fn book_path(id: &str) -> Result<String, DomainError> {
    let id = id.trim();
    if id.is_empty() || id.contains('/') {
        return Err(DomainError::InvalidIdentifier(id.to_string()));
    }
    Ok(format!("/book/{id}"))
}

impl BooksApi {
    /// Creates the API on top of a pipeline.
    #[must_use]
    pub const fn new(client: AuthenticatedClient) -> Self {
        Self { client }
    }

    /// Lists one page of the catalog. Pages start at 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn list(&self, page: u32) -> ApiResult<Vec<Book>> {
        let request = ApiRequest::get("/book/all").with_query("page", page.max(1).to_string());
        Ok(self
            .client
            .get_optional_data(&request)
            .await?
            .unwrap_or_default())
    }

    /// Full-text search. A blank query lists the first page.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn search(&self, query: &str) -> ApiResult<Vec<Book>> {
        let query = query.trim();
        if query.is_empty() {
            return self.list(1).await;
        }
        let request = ApiRequest::get("/book/search").with_query("query", query);
        Ok(self
            .client
            .get_optional_data(&request)
            .await?
            .unwrap_or_default())
    }

    /// Adds a book to the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the draft is invalid or the call fails.
    pub async fn create(&self, draft: &BookDraft) -> ApiResult<Option<Book>> {
        draft.validate()?;
        let request = ApiRequest::post("/book/create").with_body(ApiBody::Multipart(draft.to_form()));
        let book = self.client.get_optional_data(&request).await?;
        tracing::info!(title = %draft.title, "Book created");
        Ok(book)
    }

    /// Replaces a book's details. The cover is only replaced if the draft
    /// carries a new image.
    ///
    /// # Errors
    ///
    /// Returns an error if the id or draft is invalid or the call fails.
    pub async fn update(&self, id: &str, draft: &BookDraft) -> ApiResult<Option<Book>> {
        draft.validate()?;
        let request = ApiRequest::new(HttpMethod::Post, book_path(id)?)
            .with_body(ApiBody::Multipart(draft.to_form()));
        let book = self.client.get_optional_data(&request).await?;
        tracing::info!(id, "Book updated");
        Ok(book)
    }

    /// Removes a book from the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is invalid or the call fails.
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.client.execute(&ApiRequest::delete(book_path(id)?)).await?;
        tracing::info!(id, "Book deleted");
        Ok(())
    }
}
