//! Domain errors for catalog maintenance.
//!
//! Commands propagate these through `anyhow`, so callers can still
//! `downcast_ref::<CatalogError>()` when they need to tell them apart.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// The argument is not an Amazon product URL or amzn.to short link.
    #[error("Please provide a valid Amazon product URL or amzn.to short link (got '{0}')")]
    InvalidUrl(String),

    /// The store has no category vocabulary to offer.
    #[error("No categories found in {0}")]
    NoCategories(String),

    #[error("A product name is required")]
    MissingName,

    #[error("A product with id \"{0}\" already exists")]
    DuplicateId(String),

    #[error("No image URL provided")]
    MissingImageUrl,

    /// Non-success HTTP response.
    #[error("Request to {url} failed with status {status}")]
    HttpStatus { url: String, status: u16 },

    /// The catalog file could not be parsed or failed validation.
    #[error("Invalid catalog {path}: {message}")]
    CatalogParse { path: String, message: String },

    #[error("No product with id \"{0}\" in the catalog")]
    RecordNotFound(String),
}
