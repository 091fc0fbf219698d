#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use bizdir_core::upload::UploadConstraints;
use http_body_util::BodyExt;
use tower::ServiceExt;

use bizdir_api::config::ServerConfig;
use bizdir_api::router::build_app_router;
use bizdir_api::state::AppState;
use bizdir_api::store::GalleryStore;

/// Multipart boundary used by [`multipart_body`].
pub const BOUNDARY: &str = "bizdir-test-boundary";

pub const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
pub const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0];

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        upload: UploadConstraints::default(),
    }
}

/// Build the full application router over a fresh, empty store.
pub fn build_test_app() -> Router {
    build_test_app_with(test_config())
}

pub fn build_test_app_with(config: ServerConfig) -> Router {
    let state = AppState {
        store: Arc::new(GalleryStore::new()),
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// A file part for [`multipart_body`]: `(file_name, content_type, bytes)`.
pub type Part<'a> = (&'a str, &'a str, Vec<u8>);

pub fn png_bytes(size: usize) -> Vec<u8> {
    let mut data = PNG_MAGIC.to_vec();
    data.resize(size.max(PNG_MAGIC.len()), 0);
    data
}

pub fn jpeg_bytes(size: usize) -> Vec<u8> {
    let mut data = JPEG_MAGIC.to_vec();
    data.resize(size.max(JPEG_MAGIC.len()), 0);
    data
}

/// Encode `parts` as `multipart/form-data` under the given field name.
pub fn multipart_body(field: &str, parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for (file_name, content_type, data) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn put_empty(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::PUT)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn put_json(app: Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::PUT)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_multipart(app: Router, uri: &str, body: Vec<u8>) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Upload `parts` as `images` and return the response.
pub async fn upload(app: Router, parent_id: i64, parts: &[Part<'_>]) -> Response<Body> {
    post_multipart(
        app,
        &format!("/api/v1/businesses/{parent_id}/images"),
        multipart_body("images", parts),
    )
    .await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Image ids from a JSON array of images, in array order.
pub fn image_ids(images: &serde_json::Value) -> Vec<i64> {
    images
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_i64().unwrap())
        .collect()
}
