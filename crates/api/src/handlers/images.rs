//! Handlers for business image galleries.
//!
//! Every route is scoped to one business (`parent_id`). Reads answer with a
//! `{ "data": [...] }` envelope; mutations answer with a message, and uploads
//! also carry the refreshed image list.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use bizdir_core::gallery::AssetRef;
use bizdir_core::types::DbId;
use bizdir_core::upload::UploadFile;
use bizdir_gateway::{MessageResponse, UploadResponse};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Multipart field name carrying image files.
pub const UPLOAD_FIELD: &str = "images";

/// Request body for `PUT /businesses/{parent_id}/images/order`.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub image_ids: Vec<DbId>,
}

/// GET /api/v1/businesses/{parent_id}/images
pub async fn list_images(
    State(state): State<AppState>,
    Path(parent_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<AssetRef>>>> {
    let images = state.store.list(parent_id).await;
    Ok(Json(DataResponse { data: images }))
}

/// POST /api/v1/businesses/{parent_id}/images
///
/// Accept a multipart batch of `images` parts. The batch is validated as a
/// whole; nothing is stored unless every file passes.
pub async fn upload_images(
    State(state): State<AppState>,
    Path(parent_id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<UploadResponse>)> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            tracing::debug!(parent_id, field = ?field.name(), "Skipping unexpected multipart field");
            continue;
        }

        let file_name = field.file_name().unwrap_or("unknown").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        files.push(UploadFile::new(file_name, content_type, data.to_vec()));
    }

    let images = state
        .store
        .add_batch(parent_id, &files, &state.config.upload)
        .await?;

    let message = match files.len() {
        1 => "1 image uploaded successfully".to_string(),
        n => format!("{n} images uploaded successfully"),
    };

    Ok((StatusCode::CREATED, Json(UploadResponse { message, images })))
}

/// DELETE /api/v1/businesses/{parent_id}/images/{image_id}
pub async fn delete_image(
    State(state): State<AppState>,
    Path((parent_id, image_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<MessageResponse>> {
    state.store.remove(parent_id, image_id).await?;
    Ok(Json(MessageResponse::new("Image deleted successfully")))
}

/// PUT /api/v1/businesses/{parent_id}/images/{image_id}/principal
pub async fn set_principal_image(
    State(state): State<AppState>,
    Path((parent_id, image_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<MessageResponse>> {
    state.store.set_principal(parent_id, image_id).await?;
    Ok(Json(MessageResponse::new("Principal image updated")))
}

/// PUT /api/v1/businesses/{parent_id}/images/order
pub async fn reorder_images(
    State(state): State<AppState>,
    Path(parent_id): Path<DbId>,
    Json(input): Json<ReorderRequest>,
) -> AppResult<Json<MessageResponse>> {
    state.store.reorder(parent_id, &input.image_ids).await?;
    Ok(Json(MessageResponse::new("Image order saved")))
}
