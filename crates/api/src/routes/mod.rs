pub mod health;
pub mod images;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /businesses/{parent_id}/images                        list, upload
/// /businesses/{parent_id}/images/order                  reorder (PUT)
/// /businesses/{parent_id}/images/{image_id}             delete
/// /businesses/{parent_id}/images/{image_id}/principal   set principal (PUT)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/businesses/{parent_id}/images", images::router())
}
