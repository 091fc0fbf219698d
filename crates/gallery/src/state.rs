//! Observable state of one gallery.

use bizdir_core::gallery::{AssetCollection, AssetRef};
use bizdir_core::types::DbId;
use serde::{Deserialize, Serialize};

/// Progress reported once the batch has passed validation.
pub const PROGRESS_VALIDATED: u8 = 25;

/// Progress reported once the upload call has returned.
pub const PROGRESS_UPLOADED: u8 = 75;

/// Progress reported when the upload has been reconciled with the server.
pub const PROGRESS_DONE: u8 = 100;

/// What the engine is currently waiting on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GalleryPhase {
    #[default]
    Idle,
    Loading,
    Uploading,
    /// A delete, principal change, or reorder is in flight.
    Mutating,
}

/// Transient per-gallery operation status. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationState {
    pub uploading: bool,
    /// 0-100, only meaningful while `uploading` is true.
    pub progress: u8,
    pub error: Option<String>,
    /// Cleared automatically after the configured delay.
    pub success: Option<String>,
}

/// Full snapshot handed to readers of an [`ImageManager`](crate::engine::ImageManager).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryState {
    pub parent_id: DbId,
    pub phase: GalleryPhase,
    pub images: AssetCollection,
    pub operation: OperationState,
}

impl GalleryState {
    pub fn new(parent_id: DbId) -> Self {
        Self {
            parent_id,
            phase: GalleryPhase::Idle,
            images: AssetCollection::new(),
            operation: OperationState::default(),
        }
    }

    pub fn images(&self) -> &[AssetRef] {
        self.images.assets()
    }
}

/// Result of every public engine operation.
///
/// Failures are reported here rather than as `Err`, so callers never need
/// error handling to drive the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationOutcome {
    pub success: bool,
    pub message: String,
}

impl OperationOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
