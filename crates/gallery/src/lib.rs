//! Business image gallery engine.
//!
//! Keeps a client-held, ordered collection of images in step with the
//! remote store through an [`AssetGateway`](bizdir_gateway::AssetGateway),
//! with upload validation, progress reporting, optimistic reordering with
//! rollback, and self-expiring success messages.

pub mod config;
pub mod engine;
pub mod events;
pub mod registry;
pub mod state;

pub use config::GalleryConfig;
pub use engine::ImageManager;
pub use events::GalleryEvent;
pub use registry::GalleryRegistry;
pub use state::{GalleryPhase, GalleryState, OperationOutcome, OperationState};
