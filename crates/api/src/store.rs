//! In-memory image galleries.
//!
//! [`GalleryStore`] keeps every business gallery in process memory. It is
//! the authoritative side of the gallery contract: it assigns ids, keeps
//! `order` dense, and keeps exactly one principal image in any non-empty
//! gallery. Nothing is written to disk.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};

use bizdir_core::error::CoreError;
use bizdir_core::gallery::AssetRef;
use bizdir_core::types::DbId;
use bizdir_core::upload::{extension_for, validate_batch, UploadConstraints, UploadFile};
use tokio::sync::RwLock;

/// Entity name used in not-found errors.
const IMAGE_ENTITY: &str = "Image";

/// Process-wide gallery storage.
pub struct GalleryStore {
    galleries: RwLock<HashMap<DbId, Vec<AssetRef>>>,
    next_id: AtomicI64,
}

impl Default for GalleryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GalleryStore {
    pub fn new() -> Self {
        Self {
            galleries: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Images of `parent_id` in display order. Unknown businesses are empty.
    pub async fn list(&self, parent_id: DbId) -> Vec<AssetRef> {
        let galleries = self.galleries.read().await;
        galleries
            .get(&parent_id)
            .map(|images| sorted_assets(images))
            .unwrap_or_default()
    }

    /// Validate and append a batch. Returns the full refreshed list.
    ///
    /// The batch is rejected as a whole if any file breaks `constraints` or
    /// its bytes do not look like the declared image type.
    pub async fn add_batch(
        &self,
        parent_id: DbId,
        files: &[UploadFile],
        constraints: &UploadConstraints,
    ) -> Result<Vec<AssetRef>, CoreError> {
        validate_batch(files, constraints).map_err(|e| CoreError::Validation(e.to_string()))?;
        for file in files {
            check_content(file)?;
        }

        let mut galleries = self.galleries.write().await;
        let images = galleries.entry(parent_id).or_default();
        let mut next_order = images.iter().map(|a| a.order + 1).max().unwrap_or(0);

        for file in files {
            let extension = extension_for(&file.content_type).unwrap_or("bin");
            let is_principal = images.is_empty();
            images.push(AssetRef {
                id: self.next_id.fetch_add(1, Ordering::SeqCst),
                url: format!("{}.{extension}", uuid::Uuid::new_v4()),
                order: next_order,
                is_principal,
            });
            next_order += 1;
        }

        tracing::info!(parent_id, count = files.len(), total = images.len(), "Images stored");
        Ok(sorted_assets(images))
    }

    /// Delete one image.
    ///
    /// Remaining images are renumbered densely; if the principal image was
    /// removed, the first remaining image becomes principal.
    pub async fn remove(&self, parent_id: DbId, image_id: DbId) -> Result<(), CoreError> {
        let mut galleries = self.galleries.write().await;
        let images = galleries
            .get_mut(&parent_id)
            .ok_or_else(|| not_found(image_id))?;

        let index = images
            .iter()
            .position(|a| a.id == image_id)
            .ok_or_else(|| not_found(image_id))?;
        let removed = images.remove(index);

        images.sort_by_key(|a| a.order);
        renumber(images);
        if removed.is_principal {
            if let Some(first) = images.first_mut() {
                first.is_principal = true;
            }
        }

        tracing::info!(parent_id, image_id, "Image removed");
        Ok(())
    }

    /// Make `image_id` the only principal image of the gallery.
    pub async fn set_principal(&self, parent_id: DbId, image_id: DbId) -> Result<(), CoreError> {
        let mut galleries = self.galleries.write().await;
        let images = galleries
            .get_mut(&parent_id)
            .ok_or_else(|| not_found(image_id))?;

        if !images.iter().any(|a| a.id == image_id) {
            return Err(not_found(image_id));
        }
        for image in images.iter_mut() {
            image.is_principal = image.id == image_id;
        }

        tracing::info!(parent_id, image_id, "Principal image set");
        Ok(())
    }

    /// Apply a new display order.
    ///
    /// `ordered_ids` may list any subset of the gallery; unlisted images
    /// follow in their previous relative order.
    pub async fn reorder(&self, parent_id: DbId, ordered_ids: &[DbId]) -> Result<(), CoreError> {
        let mut seen = HashSet::new();
        if let Some(dup) = ordered_ids.iter().find(|id| !seen.insert(**id)) {
            return Err(CoreError::Validation(format!(
                "Image id {dup} appears more than once in the new order"
            )));
        }

        let mut galleries = self.galleries.write().await;
        let images = galleries.entry(parent_id).or_default();

        if let Some(unknown) = ordered_ids
            .iter()
            .find(|id| !images.iter().any(|a| a.id == **id))
        {
            return Err(CoreError::Validation(format!(
                "Image id {unknown} does not belong to business {parent_id}"
            )));
        }

        images.sort_by_key(|a| {
            let position = ordered_ids.iter().position(|id| *id == a.id);
            (position.is_none(), position, a.order)
        });
        renumber(images);

        tracing::info!(parent_id, count = ordered_ids.len(), "Images reordered");
        Ok(())
    }
}

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: IMAGE_ENTITY,
        id,
    }
}

fn sorted_assets(images: &[AssetRef]) -> Vec<AssetRef> {
    let mut assets = images.to_vec();
    assets.sort_by_key(|a| a.order);
    assets
}

/// Rewrite `order` to match the current vector position.
fn renumber(images: &mut [AssetRef]) {
    for (position, image) in images.iter_mut().enumerate() {
        image.order = position as u32;
    }
}

/// Reject files whose leading bytes are not the declared image format.
fn check_content(file: &UploadFile) -> Result<(), CoreError> {
    let sniffed = image::guess_format(&file.data)
        .map(|format| format.to_mime_type())
        .ok();

    if sniffed == Some(file.content_type.as_str()) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "File '{}' is not a valid {} image",
            file.file_name, file.content_type
        )))
    }
}
