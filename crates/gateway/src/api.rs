//! HTTP implementation of [`AssetGateway`].
//!
//! Talks to the business directory REST API using [`reqwest`]. All routes
//! hang off `{base_url}/businesses/{parent_id}/images`.

use async_trait::async_trait;
use bizdir_core::gallery::AssetRef;
use bizdir_core::types::DbId;
use bizdir_core::upload::UploadFile;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::config::GatewayConfig;
use crate::gateway::{AssetGateway, GatewayError, MessageResponse, UploadResponse};

/// Multipart field name carrying each uploaded file.
pub const UPLOAD_FIELD: &str = "images";

/// HTTP client for the gallery endpoints of one backend.
pub struct HttpAssetGateway {
    client: reqwest::Client,
    base_url: String,
}

/// `{ "data": [...] }` envelope used by the list endpoint.
#[derive(Debug, Deserialize)]
struct ListEnvelope {
    data: Vec<AssetRef>,
}

/// `{ "error": ..., "code": ... }` body sent with non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpAssetGateway {
    /// Create a gateway with a default [`reqwest::Client`].
    ///
    /// * `base_url` - API root, e.g. `http://host:3000/api/v1`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a gateway reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Build a gateway from configuration, applying the transport timeout.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self::with_client(client, config.base_url.clone()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn images_url(&self, parent_id: DbId) -> String {
        format!("{}/businesses/{}/images", self.base_url, parent_id)
    }

    fn image_url(&self, parent_id: DbId, asset_id: DbId) -> String {
        format!("{}/{}", self.images_url(parent_id), asset_id)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code.
    ///
    /// On failure the server's `error` field becomes the message; when the
    /// body is not the expected JSON the raw text is used instead.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        let message = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(parsed) => parsed.error,
            Err(_) if body.trim().is_empty() => status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string(),
            Err(_) => body,
        };

        Err(GatewayError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl AssetGateway for HttpAssetGateway {
    async fn list(&self, parent_id: DbId) -> Result<Vec<AssetRef>, GatewayError> {
        let response = self.client.get(self.images_url(parent_id)).send().await?;
        let envelope: ListEnvelope = Self::parse_response(response).await?;
        Ok(envelope.data)
    }

    async fn upload(
        &self,
        parent_id: DbId,
        files: &[UploadFile],
    ) -> Result<UploadResponse, GatewayError> {
        let mut form = Form::new();
        for file in files {
            let part = Part::bytes(file.data.clone())
                .file_name(file.file_name.clone())
                .mime_str(&file.content_type)?;
            form = form.part(UPLOAD_FIELD, part);
        }

        tracing::debug!(parent_id, count = files.len(), "Uploading image batch");

        let response = self
            .client
            .post(self.images_url(parent_id))
            .multipart(form)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn remove(
        &self,
        parent_id: DbId,
        asset_id: DbId,
    ) -> Result<MessageResponse, GatewayError> {
        let response = self
            .client
            .delete(self.image_url(parent_id, asset_id))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn set_principal(
        &self,
        parent_id: DbId,
        asset_id: DbId,
    ) -> Result<MessageResponse, GatewayError> {
        let response = self
            .client
            .put(format!("{}/principal", self.image_url(parent_id, asset_id)))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn reorder(
        &self,
        parent_id: DbId,
        ordered_ids: &[DbId],
    ) -> Result<MessageResponse, GatewayError> {
        let body = serde_json::json!({
            "image_ids": ordered_ids,
        });

        let response = self
            .client
            .put(format!("{}/order", self.images_url(parent_id)))
            .json(&body)
            .send()
            .await?;

        Self::parse_response(response).await
    }
}
