//! Route definitions for business image galleries.

use axum::routing::{delete, get, put};
use axum::Router;

use crate::handlers::images;
use crate::state::AppState;

/// Gallery routes mounted at `/businesses/{parent_id}/images`.
///
/// ```text
/// GET    /                        -> list_images
/// POST   /                        -> upload_images
/// PUT    /order                   -> reorder_images
/// DELETE /{image_id}              -> delete_image
/// PUT    /{image_id}/principal    -> set_principal_image
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(images::list_images).post(images::upload_images))
        .route("/order", put(images::reorder_images))
        .route("/{image_id}", delete(images::delete_image))
        .route("/{image_id}/principal", put(images::set_principal_image))
}
