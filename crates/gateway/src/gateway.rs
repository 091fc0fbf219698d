//! The remote asset store contract.
//!
//! [`AssetGateway`] is everything the gallery engine needs from the
//! backend. Each call is a single request/response with no atomicity across
//! calls; any one of them may fail independently.

use async_trait::async_trait;
use bizdir_core::gallery::AssetRef;
use bizdir_core::types::DbId;
use bizdir_core::upload::UploadFile;
use serde::{Deserialize, Serialize};

/// Plain `{ "message": ... }` acknowledgement returned by mutating calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response to a batch upload: a message plus the full refreshed list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub images: Vec<AssetRef>,
}

/// Errors from the remote asset store.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("Server error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, or the raw body when it carried none.
        message: String,
    },

    /// Any other transport failure, described by its message.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl GatewayError {
    /// Human-readable text suitable for showing to the user.
    ///
    /// Server rejections surface the server's own message verbatim.
    pub fn message(&self) -> String {
        match self {
            GatewayError::Api { message, .. } => message.clone(),
            GatewayError::Transport(message) => message.clone(),
            GatewayError::Request(e) if e.is_timeout() => "The server took too long to respond".to_string(),
            GatewayError::Request(e) if e.is_connect() => "Could not reach the server".to_string(),
            GatewayError::Request(e) => e.to_string(),
        }
    }
}

/// Operations on the image gallery of one business.
#[async_trait]
pub trait AssetGateway: Send + Sync {
    /// Current images of `parent_id`.
    async fn list(&self, parent_id: DbId) -> Result<Vec<AssetRef>, GatewayError>;

    /// Upload one batch. Returns the server message and the full refreshed list.
    async fn upload(
        &self,
        parent_id: DbId,
        files: &[UploadFile],
    ) -> Result<UploadResponse, GatewayError>;

    async fn remove(&self, parent_id: DbId, asset_id: DbId)
        -> Result<MessageResponse, GatewayError>;

    async fn set_principal(
        &self,
        parent_id: DbId,
        asset_id: DbId,
    ) -> Result<MessageResponse, GatewayError>;

    /// Persist a new display order given as asset ids, first to last.
    async fn reorder(
        &self,
        parent_id: DbId,
        ordered_ids: &[DbId],
    ) -> Result<MessageResponse, GatewayError>;
}
