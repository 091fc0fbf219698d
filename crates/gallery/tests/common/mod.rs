//! Scripted in-memory [`AssetGateway`] for engine tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bizdir_core::gallery::AssetRef;
use bizdir_core::types::DbId;
use bizdir_core::upload::UploadFile;
use bizdir_gateway::{AssetGateway, GatewayError, MessageResponse, UploadResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    List,
    Upload,
    Remove,
    SetPrincipal,
    Reorder,
}

/// A gateway call as received by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Upload { count: usize },
    Remove(DbId),
    SetPrincipal(DbId),
    Reorder(Vec<DbId>),
}

pub struct MockGateway {
    images: Mutex<Vec<AssetRef>>,
    next_id: AtomicI64,
    failing: Mutex<HashSet<Op>>,
    failing_once: Mutex<HashSet<Op>>,
    calls: Mutex<Vec<Call>>,
    /// List, remove and reorder wait on this before answering.
    gate: tokio::sync::Mutex<()>,
}

impl MockGateway {
    pub fn new(images: Vec<AssetRef>) -> Arc<Self> {
        let next_id = images.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        Arc::new(Self {
            images: Mutex::new(images),
            next_id: AtomicI64::new(next_id),
            failing: Mutex::new(HashSet::new()),
            failing_once: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
            gate: tokio::sync::Mutex::new(()),
        })
    }

    pub fn fail(&self, op: Op) {
        self.failing.lock().unwrap().insert(op);
    }

    /// Fail only the next call of `op`.
    pub fn fail_once(&self, op: Op) {
        self.failing_once.lock().unwrap().insert(op);
    }

    pub fn succeed(&self, op: Op) {
        self.failing.lock().unwrap().remove(&op);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn server_ids(&self) -> Vec<DbId> {
        let mut images = self.images.lock().unwrap().clone();
        images.sort_by_key(|a| a.order);
        images.iter().map(|a| a.id).collect()
    }

    /// Simulate a change made by another session.
    pub fn set_server_images(&self, images: Vec<AssetRef>) {
        *self.images.lock().unwrap() = images;
    }

    /// Block list, remove and reorder calls until the returned guard is dropped.
    pub async fn hold(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.gate.lock().await
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, op: Op) -> Result<(), GatewayError> {
        let once = self.failing_once.lock().unwrap().remove(&op);
        if once || self.failing.lock().unwrap().contains(&op) {
            return Err(GatewayError::Api {
                status: 500,
                message: format!("{op:?} failed"),
            });
        }
        Ok(())
    }

    fn not_found() -> GatewayError {
        GatewayError::Api {
            status: 404,
            message: "Image not found".into(),
        }
    }
}

#[async_trait]
impl AssetGateway for MockGateway {
    async fn list(&self, _parent_id: DbId) -> Result<Vec<AssetRef>, GatewayError> {
        self.record(Call::List);
        let _gate = self.gate.lock().await;
        self.check(Op::List)?;
        Ok(self.images.lock().unwrap().clone())
    }

    async fn upload(
        &self,
        _parent_id: DbId,
        files: &[UploadFile],
    ) -> Result<UploadResponse, GatewayError> {
        self.record(Call::Upload { count: files.len() });
        self.check(Op::Upload)?;

        let mut images = self.images.lock().unwrap();
        let mut next_order = images.iter().map(|a| a.order + 1).max().unwrap_or(0);
        for file in files {
            let is_principal = images.is_empty();
            images.push(AssetRef {
                id: self.next_id.fetch_add(1, Ordering::SeqCst),
                url: file.file_name.clone(),
                order: next_order,
                is_principal,
            });
            next_order += 1;
        }

        Ok(UploadResponse {
            message: format!("{} images uploaded", files.len()),
            images: images.clone(),
        })
    }

    async fn remove(&self, _parent_id: DbId, asset_id: DbId) -> Result<MessageResponse, GatewayError> {
        self.record(Call::Remove(asset_id));
        let _gate = self.gate.lock().await;
        self.check(Op::Remove)?;

        let mut images = self.images.lock().unwrap();
        let before = images.len();
        images.retain(|a| a.id != asset_id);
        if images.len() == before {
            return Err(Self::not_found());
        }
        Ok(MessageResponse::new("Image deleted"))
    }

    async fn set_principal(
        &self,
        _parent_id: DbId,
        asset_id: DbId,
    ) -> Result<MessageResponse, GatewayError> {
        self.record(Call::SetPrincipal(asset_id));
        self.check(Op::SetPrincipal)?;

        let mut images = self.images.lock().unwrap();
        if !images.iter().any(|a| a.id == asset_id) {
            return Err(Self::not_found());
        }
        for image in images.iter_mut() {
            image.is_principal = image.id == asset_id;
        }
        Ok(MessageResponse::new("Principal image updated"))
    }

    async fn reorder(
        &self,
        _parent_id: DbId,
        ordered_ids: &[DbId],
    ) -> Result<MessageResponse, GatewayError> {
        self.record(Call::Reorder(ordered_ids.to_vec()));
        let _gate = self.gate.lock().await;
        self.check(Op::Reorder)?;

        let mut images = self.images.lock().unwrap();
        if ordered_ids.iter().any(|id| !images.iter().any(|a| a.id == *id)) {
            return Err(GatewayError::Api {
                status: 400,
                message: "Unknown image id in order".into(),
            });
        }
        images.sort_by_key(|a| {
            let position = ordered_ids.iter().position(|id| *id == a.id);
            (position.is_none(), position, a.order)
        });
        for (position, image) in images.iter_mut().enumerate() {
            image.order = position as u32;
        }
        Ok(MessageResponse::new("Order saved"))
    }
}

pub fn asset(id: DbId, order: u32, is_principal: bool) -> AssetRef {
    AssetRef {
        id,
        url: format!("image-{id}.jpg"),
        order,
        is_principal,
    }
}

pub fn jpeg(name: &str, size: usize) -> UploadFile {
    UploadFile::new(name, "image/jpeg", vec![0xFF; size])
}

pub fn ids(images: &[AssetRef]) -> Vec<DbId> {
    images.iter().map(|a| a.id).collect()
}
