//! Image management engine for one business gallery.
//!
//! [`ImageManager`] owns the client copy of a gallery and keeps it in step
//! with the remote store:
//!
//! - loads replace the collection wholesale; a failed load keeps the old one;
//! - uploads are validated as a batch, then reconciled by reloading;
//! - delete and principal changes wait for server confirmation;
//! - reorders apply locally first and roll back by reloading on failure.
//!
//! Gateway calls are issued one at a time in arrival order. An intent that
//! arrives while another call is in flight waits for it to settle before
//! its own call goes out; there is no cancellation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bizdir_core::gallery::{AssetCollection, AssetRef};
use bizdir_core::types::DbId;
use bizdir_core::upload::{validate_batch, UploadFile};
use bizdir_gateway::{AssetGateway, GatewayError};
use tokio::sync::{broadcast, watch, Mutex};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::config::GalleryConfig;
use crate::events::{GalleryEvent, EVENT_CHANNEL_CAPACITY};
use crate::state::{
    GalleryPhase, GalleryState, OperationOutcome, PROGRESS_DONE, PROGRESS_UPLOADED,
    PROGRESS_VALIDATED,
};

/// Owns the image collection and operation state of a single business.
///
/// Create one per attached business and drop it (or call
/// [`shutdown`](Self::shutdown)) when the business is no longer shown.
/// Instances for different businesses share nothing.
pub struct ImageManager {
    parent_id: DbId,
    gateway: Arc<dyn AssetGateway>,
    config: GalleryConfig,
    shared: Arc<Shared>,
    /// Held for the duration of every gateway call.
    in_flight: Mutex<()>,
    /// Parent of every success-expiry timer.
    cancel: CancellationToken,
    _cancel_on_drop: DropGuard,
}

impl ImageManager {
    pub fn new(parent_id: DbId, gateway: Arc<dyn AssetGateway>, config: GalleryConfig) -> Self {
        let (state, _) = watch::channel(GalleryState::new(parent_id));
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();

        Self {
            parent_id,
            gateway,
            config,
            shared: Arc::new(Shared {
                parent_id,
                state,
                events,
                success_seq: AtomicU64::new(0),
            }),
            in_flight: Mutex::new(()),
            _cancel_on_drop: cancel.clone().drop_guard(),
            cancel,
        }
    }

    pub fn parent_id(&self) -> DbId {
        self.parent_id
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    // ---- read access ----

    /// Snapshot of the current state.
    pub fn state(&self) -> GalleryState {
        self.shared.snapshot()
    }

    /// Watch the latest state. Intermediate values may be skipped.
    pub fn subscribe(&self) -> watch::Receiver<GalleryState> {
        self.shared.state.subscribe()
    }

    /// Receive every event from now on.
    pub fn events(&self) -> broadcast::Receiver<GalleryEvent> {
        self.shared.events.subscribe()
    }

    pub fn images(&self) -> Vec<AssetRef> {
        self.shared.state.borrow().images.assets().to_vec()
    }

    pub fn uploading(&self) -> bool {
        self.shared.state.borrow().operation.uploading
    }

    pub fn progress(&self) -> u8 {
        self.shared.state.borrow().operation.progress
    }

    pub fn error(&self) -> Option<String> {
        self.shared.state.borrow().operation.error.clone()
    }

    pub fn success(&self) -> Option<String> {
        self.shared.state.borrow().operation.success.clone()
    }

    pub fn phase(&self) -> GalleryPhase {
        self.shared.state.borrow().phase
    }

    // ---- intents ----

    /// Dismiss the current error message.
    pub fn clear_error(&self) {
        self.shared.state.send_modify(|s| s.operation.error = None);
    }

    /// Replace the local collection with the server's list.
    ///
    /// On failure the previous collection is kept and `error` is set.
    pub async fn load_images(&self) -> OperationOutcome {
        let _in_flight = self.in_flight.lock().await;
        let _settle = Settle::new(&self.shared, false);
        self.shared.clear_messages();
        self.shared.set_phase(GalleryPhase::Loading);

        match self.refresh().await {
            Ok(count) => OperationOutcome::ok(format!("Loaded {count} images")),
            Err(e) => {
                let message = e.message();
                tracing::warn!(parent_id = self.parent_id, error = %e, "Failed to load images");
                self.shared.set_error(message.clone());
                OperationOutcome::failed(message)
            }
        }
    }

    /// Validate and upload one batch, then reload the authoritative list.
    ///
    /// `uploading` and `progress` are reset on every exit path, including
    /// when the returned future is dropped before completion.
    pub async fn upload_images(&self, files: Vec<UploadFile>) -> OperationOutcome {
        let _in_flight = self.in_flight.lock().await;
        self.shared.clear_messages();
        self.shared.begin_upload();
        let _settle = Settle::new(&self.shared, true);

        let files = match validate_batch(&files, &self.config.constraints) {
            Ok(files) => files,
            Err(rejection) => {
                tracing::warn!(
                    parent_id = self.parent_id,
                    count = files.len(),
                    reason = %rejection,
                    "Upload batch rejected",
                );
                let message = rejection.to_string();
                self.shared.set_error(message.clone());
                return OperationOutcome::failed(message);
            }
        };
        self.shared.set_progress(PROGRESS_VALIDATED);
        self.shared.set_phase(GalleryPhase::Uploading);

        let response = match self.gateway.upload(self.parent_id, files).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(parent_id = self.parent_id, error = %e, "Image upload failed");
                let message = e.message();
                self.shared.set_error(message.clone());
                return OperationOutcome::failed(message);
            }
        };
        self.shared.set_progress(PROGRESS_UPLOADED);

        if let Err(e) = self.refresh().await {
            tracing::warn!(
                parent_id = self.parent_id,
                error = %e,
                "Reload after upload failed, using list from upload response",
            );
            self.shared
                .replace_collection(AssetCollection::from_server(response.images));
        }
        self.shared.set_progress(PROGRESS_DONE);

        tracing::info!(parent_id = self.parent_id, count = files.len(), "Images uploaded");
        self.publish_success(response.message.clone());
        OperationOutcome::ok(response.message)
    }

    /// Delete one image once the server confirms it.
    pub async fn delete_image(&self, asset_id: DbId) -> OperationOutcome {
        let _in_flight = self.in_flight.lock().await;
        let _settle = Settle::new(&self.shared, false);
        self.shared.clear_messages();
        self.shared.set_phase(GalleryPhase::Mutating);

        match self.gateway.remove(self.parent_id, asset_id).await {
            Ok(response) => {
                self.shared.modify_collection(|c| c.remove(asset_id).is_some());
                tracing::info!(parent_id = self.parent_id, asset_id, "Image deleted");
                self.publish_success(response.message.clone());
                OperationOutcome::ok(response.message)
            }
            Err(e) => {
                tracing::warn!(parent_id = self.parent_id, asset_id, error = %e, "Image delete failed");
                let message = e.message();
                self.shared.set_error(message.clone());
                OperationOutcome::failed(message)
            }
        }
    }

    /// Make `asset_id` the cover image once the server confirms it.
    pub async fn mark_as_principal(&self, asset_id: DbId) -> OperationOutcome {
        let _in_flight = self.in_flight.lock().await;
        let _settle = Settle::new(&self.shared, false);
        self.shared.clear_messages();
        self.shared.set_phase(GalleryPhase::Mutating);

        match self.gateway.set_principal(self.parent_id, asset_id).await {
            Ok(response) => {
                let applied = self.shared.modify_collection(|c| c.set_principal(asset_id));
                if !applied {
                    tracing::info!(
                        parent_id = self.parent_id,
                        asset_id,
                        "Principal image not in local collection, reloading",
                    );
                    if let Err(e) = self.refresh().await {
                        tracing::warn!(parent_id = self.parent_id, error = %e, "Reload failed");
                    }
                }
                tracing::info!(parent_id = self.parent_id, asset_id, "Principal image set");
                self.publish_success(response.message.clone());
                OperationOutcome::ok(response.message)
            }
            Err(e) => {
                tracing::warn!(
                    parent_id = self.parent_id,
                    asset_id,
                    error = %e,
                    "Setting principal image failed",
                );
                let message = e.message();
                self.shared.set_error(message.clone());
                OperationOutcome::failed(message)
            }
        }
    }

    /// Show `new_order` immediately, then persist it.
    ///
    /// Known images missing from `new_order` stay at the end in their
    /// current relative order; ids not in the collection are ignored. If
    /// another call is in flight, the order is applied again once it
    /// settles, so a reload in between does not discard it. Only ids
    /// present at that point are sent to the server. On failure the
    /// collection is reloaded from the server, undoing the local change.
    pub async fn reorder_images(&self, new_order: Vec<AssetRef>) -> OperationOutcome {
        self.shared.clear_messages();
        self.apply_order(&new_order);
        tracing::debug!(parent_id = self.parent_id, "Applied local reorder");

        let _in_flight = self.in_flight.lock().await;
        let _settle = Settle::new(&self.shared, false);
        self.shared.set_phase(GalleryPhase::Mutating);
        let ordered_ids = self.apply_order(&new_order);
        if ordered_ids.len() != new_order.len() {
            tracing::debug!(
                parent_id = self.parent_id,
                submitted = ordered_ids.len(),
                requested = new_order.len(),
                "Reorder includes images not in the local collection",
            );
        }

        match self.gateway.reorder(self.parent_id, &ordered_ids).await {
            Ok(response) => {
                tracing::info!(parent_id = self.parent_id, count = ordered_ids.len(), "Images reordered");
                self.publish_success(response.message.clone());
                OperationOutcome::ok(response.message)
            }
            Err(e) => {
                tracing::warn!(
                    parent_id = self.parent_id,
                    error = %e,
                    "Reorder failed, restoring server order",
                );
                let message = e.message();
                if let Err(reload) = self.refresh().await {
                    tracing::warn!(parent_id = self.parent_id, error = %reload, "Rollback reload failed");
                }
                self.shared.set_error(message.clone());
                OperationOutcome::failed(message)
            }
        }
    }

    /// Cancel pending success-expiry timers. Also happens on drop.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    // ---- private helpers ----

    /// Put `new_order` first, followed by the rest of the current collection.
    ///
    /// Returns the ids of `new_order` that are still in the collection.
    fn apply_order(&self, new_order: &[AssetRef]) -> Vec<DbId> {
        let current = self.shared.snapshot().images;
        let mut ordered_ids: Vec<DbId> = Vec::with_capacity(new_order.len());
        for asset in new_order {
            if current.contains(asset.id) && !ordered_ids.contains(&asset.id) {
                ordered_ids.push(asset.id);
            }
        }

        let sequence: Vec<AssetRef> = ordered_ids
            .iter()
            .filter_map(|id| current.get(*id))
            .chain(current.iter().filter(|a| !ordered_ids.contains(&a.id)))
            .cloned()
            .collect();

        let reordered = AssetCollection::reordered(sequence);
        if reordered != current {
            self.shared.replace_collection(reordered);
        }
        ordered_ids
    }

    /// Fetch the server list and adopt it. Leaves `error` untouched.
    async fn refresh(&self) -> Result<usize, GatewayError> {
        let assets = self.gateway.list(self.parent_id).await?;
        let collection = AssetCollection::from_server(assets);
        let count = collection.len();
        self.shared.replace_collection(collection);
        tracing::debug!(parent_id = self.parent_id, count, "Gallery reloaded");
        Ok(count)
    }

    /// Show a success message and schedule it to clear.
    fn publish_success(&self, message: String) {
        let seq = self.shared.set_success(message);
        let shared = Arc::clone(&self.shared);
        let cancel = self.cancel.child_token();
        let ttl = self.config.success_ttl;

        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(ttl) => shared.expire_success(seq),
            }
        });
    }
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// State reachable from spawned expiry timers.
struct Shared {
    parent_id: DbId,
    state: watch::Sender<GalleryState>,
    events: broadcast::Sender<GalleryEvent>,
    /// Incremented whenever the success message is set or cleared, so a
    /// stale timer never clears a newer message.
    success_seq: AtomicU64,
}

impl Shared {
    fn snapshot(&self) -> GalleryState {
        self.state.borrow().clone()
    }

    fn emit(&self, event: GalleryEvent) {
        // Zero receivers is not an error.
        let _ = self.events.send(event);
    }

    fn set_phase(&self, phase: GalleryPhase) {
        self.state.send_modify(|s| s.phase = phase);
    }

    fn replace_collection(&self, images: AssetCollection) {
        let count = images.len();
        self.state.send_modify(|s| s.images = images);
        self.emit(GalleryEvent::CollectionChanged {
            parent_id: self.parent_id,
            count,
        });
    }

    /// Apply `f` to the collection; emits a change event when it returns `true`.
    fn modify_collection(&self, f: impl FnOnce(&mut AssetCollection) -> bool) -> bool {
        let mut count = 0;
        let changed = self.state.send_if_modified(|s| {
            let changed = f(&mut s.images);
            count = s.images.len();
            changed
        });
        if changed {
            self.emit(GalleryEvent::CollectionChanged {
                parent_id: self.parent_id,
                count,
            });
        }
        changed
    }

    fn begin_upload(&self) {
        self.state.send_modify(|s| {
            s.operation.uploading = true;
            s.operation.progress = 0;
        });
        self.emit(GalleryEvent::Progress {
            parent_id: self.parent_id,
            percent: 0,
        });
    }

    /// Raise progress; never moves it backwards.
    fn set_progress(&self, percent: u8) {
        let mut current = 0;
        self.state.send_modify(|s| {
            s.operation.progress = s.operation.progress.max(percent.min(100));
            current = s.operation.progress;
        });
        self.emit(GalleryEvent::Progress {
            parent_id: self.parent_id,
            percent: current,
        });
    }

    fn end_upload(&self) {
        self.state.send_modify(|s| {
            s.operation.uploading = false;
            s.operation.progress = 0;
        });
        self.emit(GalleryEvent::UploadFinished {
            parent_id: self.parent_id,
        });
    }

    fn clear_messages(&self) {
        self.success_seq.fetch_add(1, Ordering::SeqCst);
        self.state.send_modify(|s| {
            s.operation.error = None;
            s.operation.success = None;
        });
    }

    fn set_error(&self, message: String) {
        self.success_seq.fetch_add(1, Ordering::SeqCst);
        self.state.send_modify(|s| {
            s.operation.success = None;
            s.operation.error = Some(message.clone());
        });
        self.emit(GalleryEvent::Error {
            parent_id: self.parent_id,
            message,
        });
    }

    /// Returns the sequence number identifying this message.
    fn set_success(&self, message: String) -> u64 {
        let seq = self.success_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| {
            s.operation.error = None;
            s.operation.success = Some(message.clone());
        });
        self.emit(GalleryEvent::Success {
            parent_id: self.parent_id,
            message,
        });
        seq
    }

    fn expire_success(&self, seq: u64) {
        let cleared = self.state.send_if_modified(|s| {
            if self.success_seq.load(Ordering::SeqCst) != seq || s.operation.success.is_none() {
                return false;
            }
            s.operation.success = None;
            true
        });
        if cleared {
            self.emit(GalleryEvent::SuccessExpired {
                parent_id: self.parent_id,
            });
        }
    }
}

/// Returns the gallery to `Idle` when an operation ends, however it ends.
/// Upload operations also reset `uploading` and `progress`.
struct Settle<'a> {
    shared: &'a Shared,
    upload: bool,
}

impl<'a> Settle<'a> {
    fn new(shared: &'a Shared, upload: bool) -> Self {
        Self { shared, upload }
    }
}

impl Drop for Settle<'_> {
    fn drop(&mut self) {
        if self.upload {
            self.shared.end_upload();
        }
        self.shared.set_phase(GalleryPhase::Idle);
    }
}
