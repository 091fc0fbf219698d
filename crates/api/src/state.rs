use std::sync::Arc;

use crate::config::ServerConfig;
use crate::store::GalleryStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// In-memory image galleries, keyed by business id.
    pub store: Arc<GalleryStore>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
