//! `SeaORM` implementation of the `CatalogService` trait.

use crate::db::{Item, Store};
use crate::services::catalog_service::{CatalogError, CatalogService, ItemDto};
use async_trait::async_trait;

pub struct SeaOrmCatalogService {
    store: Store,
}

impl SeaOrmCatalogService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

fn to_dto(item: Item) -> ItemDto {
    ItemDto {
        id: item.id,
        text: item.text,
        category: item.category,
        file: item.file,
    }
}

#[async_trait]
impl CatalogService for SeaOrmCatalogService {
    async fn create_item(
        &self,
        text: &str,
        category: &str,
        stored_file: &str,
    ) -> Result<ItemDto, CatalogError> {
        // Fast-path duplicate check; the unique index on text catches
        // the concurrent-insert race.
        let exists = self
            .store
            .item_text_exists(text)
            .await
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        if exists {
            return Err(CatalogError::Conflict("Text already exists".to_string()));
        }

        let item = self
            .store
            .create_item(text, category, stored_file)
            .await
            .map_err(|e| {
                if e.to_string().contains("UNIQUE constraint failed") {
                    CatalogError::Conflict("Text already exists".to_string())
                } else {
                    CatalogError::Database(e.to_string())
                }
            })?;

        Ok(to_dto(item))
    }

    async fn query_items(
        &self,
        category: &str,
        search: Option<&str>,
    ) -> Result<Vec<ItemDto>, CatalogError> {
        let items = self
            .store
            .find_items(category, search)
            .await
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        if items.is_empty() {
            return Err(CatalogError::NoMatches);
        }

        Ok(items.into_iter().map(to_dto).collect())
    }
}
