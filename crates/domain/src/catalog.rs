//! Catalog types: books and the admin book form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::request::FormPart;

/// A book as listed by the catalog endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Backend identifier
    #[serde(rename = "_id")]
    pub id: String,
    /// Title
    pub title: String,
    /// Unit price
    pub price: f64,
    /// Blurb
    #[serde(default)]
    pub description: String,
    /// Units in stock, when the backend reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    /// Author name
    pub author: String,
    /// Cover image location
    #[serde(rename = "imageURL", default)]
    pub image_url: String,
    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Cover image attached to a [`BookDraft`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Original file name, used to guess the content type
    pub file_name: String,
    /// Raw image bytes
    pub bytes: Vec<u8>,
}

/// Admin form for creating or editing a book.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BookDraft {
    /// Title (required)
    pub title: String,
    /// Author (required)
    pub author: String,
    /// Unit price
    pub price: f64,
    /// Units in stock
    pub quantity: u32,
    /// Blurb
    pub description: String,
    /// Tags
    pub tags: Vec<String>,
    /// Optional new cover image
    pub image: Option<ImageUpload>,
}

impl BookDraft {
    /// Pre-fills a draft from an existing book (the cover is kept server-side).
    #[must_use]
    pub fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            price: book.price,
            quantity: book.quantity.unwrap_or(0),
            description: book.description.clone(),
            tags: book.tags.clone(),
            image: None,
        }
    }

    /// Checks the fields the backend requires.
    ///
    /// # Errors
    ///
    /// Returns an error when the title or author is blank, or the price is
    /// negative or not a number.
    pub fn validate(&self) -> DomainResult<()> {
        if self.title.trim().is_empty() {
            return Err(DomainError::MissingField("title"));
        }
        if self.author.trim().is_empty() {
            return Err(DomainError::MissingField("author"));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(DomainError::InvalidNumber {
                field: "price",
                value: self.price.to_string(),
            });
        }
        Ok(())
    }

    /// Encodes the draft as multipart form fields.
    #[must_use]
    pub fn to_form(&self) -> Vec<FormPart> {
        let mut parts = vec![
            FormPart::text("title", self.title.trim()),
            FormPart::text("author", self.author.trim()),
            FormPart::text("price", self.price.to_string()),
            FormPart::text("quantity", self.quantity.to_string()),
            FormPart::text("description", self.description.as_str()),
            FormPart::text("tags", self.tags.join(", ")),
        ];
        if let Some(image) = &self.image {
            parts.push(FormPart::file(
                "image",
                image.file_name.as_str(),
                image.bytes.clone(),
            ));
        }
        parts
    }
}

/// Splits a comma-separated tag list, dropping blanks.
#[must_use]
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect()
}

/// Parses a price form field; blank means zero.
///
/// # Errors
///
/// Returns an error for non-numeric or negative input.
pub fn parse_price(input: &str) -> DomainResult<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite() && *price >= 0.0)
        .ok_or_else(|| DomainError::InvalidNumber {
            field: "price",
            value: input.to_string(),
        })
}

/// Parses a stock quantity form field; blank means zero.
///
/// # Errors
///
/// Returns an error for non-numeric or negative input.
pub fn parse_quantity(input: &str) -> DomainResult<u32> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse::<u32>()
        .map_err(|_| DomainError::InvalidNumber {
            field: "quantity",
            value: input.to_string(),
        })
}
