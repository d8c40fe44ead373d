use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::items;

/// Catalog row as exposed to services.
#[derive(Debug, Clone)]
pub struct Item {
    pub id: i32,
    pub text: String,
    pub category: String,
    pub file: String,
    pub created_at: String,
}

impl From<items::Model> for Item {
    fn from(model: items::Model) -> Self {
        Self {
            id: model.id,
            text: model.text,
            category: model.category,
            file: model.file,
            created_at: model.created_at,
        }
    }
}

pub struct ItemRepository {
    conn: DatabaseConnection,
}

impl ItemRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Fast-path duplicate check. Text is unique across the whole
    /// catalog; the unique index is the guarantee under concurrency.
    pub async fn exists_by_text(&self, text: &str) -> Result<bool> {
        let existing = items::Entity::find()
            .filter(items::Column::Text.eq(text))
            .one(&self.conn)
            .await
            .context("Failed to query item by text")?;

        Ok(existing.is_some())
    }

    pub async fn create(&self, text: &str, category: &str, file: &str) -> Result<Item> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = items::ActiveModel {
            text: Set(text.to_string()),
            category: Set(category.to_string()),
            file: Set(file.to_string()),
            created_at: Set(now),
            ..Default::default()
        };

        let model = active.insert(&self.conn).await?;

        Ok(Item::from(model))
    }

    /// All items in a category, optionally narrowed to those whose text
    /// contains `search` as a case-insensitive substring. Results come
    /// back in insertion order.
    pub async fn find_by_category(&self, category: &str, search: Option<&str>) -> Result<Vec<Item>> {
        let mut query = items::Entity::find().filter(items::Column::Category.eq(category));

        if let Some(term) = search
            && !term.trim().is_empty()
        {
            let pattern = format!("%{}%", term.trim().to_lowercase());
            query = query.filter(
                Expr::expr(Func::lower(Expr::col((
                    items::Entity,
                    items::Column::Text,
                ))))
                .like(pattern),
            );
        }

        let models = query
            .order_by_asc(items::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to query items by category")?;

        Ok(models.into_iter().map(Item::from).collect())
    }
}
