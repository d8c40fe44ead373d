//! Domain service for the tagged media-item catalog.

use serde::Serialize;
use thiserror::Error;

/// Errors specific to catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("No items found for this category and search text")]
    NoMatches,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for CatalogError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

/// Catalog item as serialized to clients.
#[derive(Debug, Clone, Serialize)]
pub struct ItemDto {
    pub id: i32,
    pub text: String,
    pub category: String,
    pub file: String,
}

/// Domain service trait for the item catalog.
#[async_trait::async_trait]
pub trait CatalogService: Send + Sync {
    /// Records an item whose binary has already been written to the
    /// content store.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Conflict`] when the text is already
    /// taken, in any category.
    async fn create_item(
        &self,
        text: &str,
        category: &str,
        stored_file: &str,
    ) -> Result<ItemDto, CatalogError>;

    /// All items in a category, optionally filtered by a
    /// case-insensitive substring of their text.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NoMatches`] when nothing matches.
    async fn query_items(
        &self,
        category: &str,
        search: Option<&str>,
    ) -> Result<Vec<ItemDto>, CatalogError>;
}
