//! Per-business engine lifecycle.
//!
//! [`GalleryRegistry`] hands out one [`ImageManager`] per attached business
//! and discards it on detach. It is meant to be owned by whatever screen
//! controller decides which businesses are being edited.

use std::collections::HashMap;
use std::sync::Arc;

use bizdir_core::types::DbId;
use bizdir_gateway::AssetGateway;
use tokio::sync::RwLock;

use crate::config::GalleryConfig;
use crate::engine::ImageManager;

pub struct GalleryRegistry {
    gateway: Arc<dyn AssetGateway>,
    config: GalleryConfig,
    managers: RwLock<HashMap<DbId, Arc<ImageManager>>>,
}

impl GalleryRegistry {
    pub fn new(gateway: Arc<dyn AssetGateway>, config: GalleryConfig) -> Self {
        Self {
            gateway,
            config,
            managers: RwLock::new(HashMap::new()),
        }
    }

    /// Engine for `parent_id`, created on first use.
    ///
    /// A new engine starts empty; call
    /// [`load_images`](ImageManager::load_images) to populate it.
    pub async fn attach(&self, parent_id: DbId) -> Arc<ImageManager> {
        if let Some(existing) = self.managers.read().await.get(&parent_id) {
            return Arc::clone(existing);
        }

        let mut managers = self.managers.write().await;
        let manager = managers.entry(parent_id).or_insert_with(|| {
            tracing::info!(parent_id, "Attaching image manager");
            Arc::new(ImageManager::new(
                parent_id,
                Arc::clone(&self.gateway),
                self.config.clone(),
            ))
        });
        Arc::clone(manager)
    }

    pub async fn get(&self, parent_id: DbId) -> Option<Arc<ImageManager>> {
        self.managers.read().await.get(&parent_id).cloned()
    }

    /// Discard the engine for `parent_id` and its pending timers.
    ///
    /// Returns `false` if nothing was attached. Callers still holding the
    /// engine can finish in-flight calls, but its state is no longer
    /// reachable through the registry.
    pub async fn detach(&self, parent_id: DbId) -> bool {
        match self.managers.write().await.remove(&parent_id) {
            Some(manager) => {
                manager.shutdown();
                tracing::info!(parent_id, "Detached image manager");
                true
            }
            None => false,
        }
    }

    /// Ids of all attached businesses, ascending.
    pub async fn attached_ids(&self) -> Vec<DbId> {
        let mut ids: Vec<DbId> = self.managers.read().await.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Detach every engine.
    pub async fn shutdown(&self) {
        let mut managers = self.managers.write().await;
        for (parent_id, manager) in managers.drain() {
            manager.shutdown();
            tracing::debug!(parent_id, "Detached image manager");
        }
    }
}
