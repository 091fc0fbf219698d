//! Discrete gallery events for presentation layers.
//!
//! The watch channel behind [`ImageManager::subscribe`](crate::engine::ImageManager::subscribe)
//! only keeps the latest state. Consumers that must see every step (a
//! progress bar, a toast queue) subscribe to these events instead.

use bizdir_core::types::DbId;
use serde::Serialize;

/// Broadcast channel capacity for gallery events.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GalleryEvent {
    /// The local collection was replaced or modified.
    CollectionChanged { parent_id: DbId, count: usize },

    /// Upload progress. Only emitted while an upload is running.
    Progress { parent_id: DbId, percent: u8 },

    /// An upload ended, successfully or not.
    UploadFinished { parent_id: DbId },

    Error { parent_id: DbId, message: String },

    Success { parent_id: DbId, message: String },

    /// The last success message timed out and was cleared.
    SuccessExpired { parent_id: DbId },
}

impl GalleryEvent {
    pub fn parent_id(&self) -> DbId {
        match self {
            GalleryEvent::CollectionChanged { parent_id, .. }
            | GalleryEvent::Progress { parent_id, .. }
            | GalleryEvent::UploadFinished { parent_id }
            | GalleryEvent::Error { parent_id, .. }
            | GalleryEvent::Success { parent_id, .. }
            | GalleryEvent::SuccessExpired { parent_id } => *parent_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serializes_with_type_tag() {
        let json = serde_json::to_value(GalleryEvent::Progress {
            parent_id: 3,
            percent: 25,
        })
        .unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["parent_id"], 3);
        assert_eq!(json["percent"], 25);
    }

    #[test]
    fn parent_id_accessor() {
        let event = GalleryEvent::SuccessExpired { parent_id: 11 };
        assert_eq!(event.parent_id(), 11);
    }
}
