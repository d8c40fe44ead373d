use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, AppState, ItemsResponse, StatusResponse};
use crate::services::ContentStore;

#[derive(Deserialize)]
pub struct ItemQuery {
    pub search: Option<String>,
}

struct Upload {
    original_name: String,
    bytes: axum::body::Bytes,
}

/// POST /NewItem (multipart)
/// Form fields `text` and `category` plus one or more `file` parts.
/// Only the first file is kept; extras are accepted and discarded. The
/// binary lands in the content store before the catalog row is written,
/// and stays there even if the insert fails.
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<StatusResponse>), ApiError> {
    let mut text: Option<String> = None;
    let mut category: Option<String> = None;
    let mut upload: Option<Upload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().map(ToString::to_string);
        match name.as_deref() {
            Some("text") => {
                text = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::validation(format!("Invalid text field: {e}")))?,
                );
            }
            Some("category") => {
                category = Some(
                    field.text().await.map_err(|e| {
                        ApiError::validation(format!("Invalid category field: {e}"))
                    })?,
                );
            }
            Some("file") if upload.is_none() => {
                let original_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::validation(format!("Invalid file upload: {e}")))?;
                upload = Some(Upload {
                    original_name,
                    bytes,
                });
            }
            // Additional file parts are drained and ignored.
            Some("file") => {
                let _ = field.bytes().await;
            }
            _ => {}
        }
    }

    let text = text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::validation("Text is required"))?;
    let category = category
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::validation("Category is required"))?;
    let upload = upload.ok_or_else(|| ApiError::validation("At least one file is required"))?;

    if !ContentStore::is_allowed(&upload.original_name) {
        return Err(ApiError::validation(
            "Invalid file type. Only images and videos are allowed.",
        ));
    }

    let filename = state
        .content_store
        .save(&upload.original_name, &upload.bytes)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to store upload: {e}")))?;

    state
        .catalog
        .create_item(text.trim(), category.trim(), &format!("uploads/{filename}"))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(StatusResponse {
            status: "Success".to_string(),
            msg: "Item added successfully".to_string(),
        }),
    ))
}

/// GET /ItemData/{category}?search=STR
/// Every item in the category whose text contains the search string,
/// case-insensitively. An empty result is a 404.
pub async fn query_items(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
    Query(query): Query<ItemQuery>,
) -> Result<Json<ItemsResponse>, ApiError> {
    let items = state
        .catalog
        .query_items(&category, query.search.as_deref())
        .await?;

    Ok(Json(ItemsResponse { items }))
}
