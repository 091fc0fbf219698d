//! Client side of the business directory image API.
//!
//! Defines the [`AssetGateway`] contract the gallery engine depends on and
//! an HTTP implementation of it built on `reqwest`.

pub mod api;
pub mod config;
pub mod gateway;

pub use api::HttpAssetGateway;
pub use config::GatewayConfig;
pub use gateway::{AssetGateway, GatewayError, MessageResponse, UploadResponse};
