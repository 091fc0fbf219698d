//! Image gallery model for a single business.
//!
//! [`AssetCollection`] is the client-held, display-ordered set of
//! [`AssetRef`]s for one parent entity. Every constructor and mutator keeps
//! two invariants:
//!
//! - at most one asset has `is_principal = true`;
//! - assets are sorted by `order`, and after any local reorder the `order`
//!   values are dense and unique.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::DbId;

// ---------------------------------------------------------------------------
// AssetRef
// ---------------------------------------------------------------------------

/// One managed image belonging to a business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    /// Identifier assigned by the remote store, never by the client.
    pub id: DbId,
    /// Filename or path, resolved to a displayable URL elsewhere.
    pub url: String,
    /// Display position. Lower sorts first.
    pub order: u32,
    /// Whether this is the cover image of the business.
    pub is_principal: bool,
}

// ---------------------------------------------------------------------------
// AssetCollection
// ---------------------------------------------------------------------------

/// Ordered collection of images for one parent entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AssetCollection {
    assets: Vec<AssetRef>,
}

impl AssetCollection {
    /// An empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from a list reported by the server.
    ///
    /// The list is authoritative: it is sorted by `order` (ties broken by
    /// `id`) and otherwise kept as reported. If more than one asset claims
    /// to be principal, only the first in display order keeps the flag.
    pub fn from_server(mut assets: Vec<AssetRef>) -> Self {
        assets.sort_by_key(|a| (a.order, a.id));
        let cleared = keep_first_principal(&mut assets);
        if cleared > 0 {
            tracing::warn!(cleared, "Server reported multiple principal images");
        }
        Self { assets }
    }

    /// Build a collection from a user-supplied display sequence.
    ///
    /// Positions are taken from the sequence itself: `order` is rewritten to
    /// the index of each asset. Repeated ids keep their first occurrence.
    pub fn reordered(sequence: Vec<AssetRef>) -> Self {
        let mut seen = HashSet::new();
        let mut assets: Vec<AssetRef> = sequence
            .into_iter()
            .filter(|a| seen.insert(a.id))
            .collect();

        for (position, asset) in assets.iter_mut().enumerate() {
            asset.order = position as u32;
        }
        keep_first_principal(&mut assets);

        Self { assets }
    }

    pub fn assets(&self) -> &[AssetRef] {
        &self.assets
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AssetRef> {
        self.assets.iter()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn get(&self, id: DbId) -> Option<&AssetRef> {
        self.assets.iter().find(|a| a.id == id)
    }

    pub fn contains(&self, id: DbId) -> bool {
        self.get(id).is_some()
    }

    /// Asset ids in display order.
    pub fn ids(&self) -> Vec<DbId> {
        self.assets.iter().map(|a| a.id).collect()
    }

    /// The current cover image, if any.
    pub fn principal(&self) -> Option<&AssetRef> {
        self.assets.iter().find(|a| a.is_principal)
    }

    pub fn principal_count(&self) -> usize {
        self.assets.iter().filter(|a| a.is_principal).count()
    }

    /// `true` when no two assets share an `order` value.
    pub fn has_unique_orders(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.assets.len());
        self.assets.iter().all(|a| seen.insert(a.order))
    }

    /// Remove an asset by identity. Remaining assets keep their order.
    pub fn remove(&mut self, id: DbId) -> Option<AssetRef> {
        let index = self.assets.iter().position(|a| a.id == id)?;
        Some(self.assets.remove(index))
    }

    /// Make `id` the only principal asset.
    ///
    /// This is a full reassignment: every other asset loses the flag.
    /// Returns `false` (and changes nothing) when `id` is not present.
    pub fn set_principal(&mut self, id: DbId) -> bool {
        if !self.contains(id) {
            return false;
        }
        for asset in &mut self.assets {
            asset.is_principal = asset.id == id;
        }
        true
    }

    pub fn into_vec(self) -> Vec<AssetRef> {
        self.assets
    }
}

impl<'a> IntoIterator for &'a AssetCollection {
    type Item = &'a AssetRef;
    type IntoIter = std::slice::Iter<'a, AssetRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.assets.iter()
    }
}

/// Clear the principal flag on every asset after the first flagged one.
/// Returns how many flags were cleared.
fn keep_first_principal(assets: &mut [AssetRef]) -> usize {
    let mut found = false;
    let mut cleared = 0;
    for asset in assets.iter_mut().filter(|a| a.is_principal) {
        if found {
            asset.is_principal = false;
            cleared += 1;
        }
        found = true;
    }
    cleared
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
