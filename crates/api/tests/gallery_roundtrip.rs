//! End-to-end: the gallery engine talking HTTP to a live server.
//!
//! A real listener is bound on an ephemeral port so the `reqwest`-based
//! gateway exercises the same wire format a deployed client would.

mod common;

use std::sync::Arc;
use std::time::Duration;

use bizdir_core::upload::UploadFile;
use bizdir_gallery::{GalleryConfig, ImageManager};
use bizdir_gateway::{AssetGateway, GatewayConfig, GatewayError, HttpAssetGateway};
use common::{jpeg_bytes, png_bytes};

/// Serve a fresh app and return the API root URL.
async fn spawn_server() -> String {
    let app = common::build_test_app();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api/v1")
}

fn manager(base_url: &str, parent_id: i64) -> ImageManager {
    let config = GatewayConfig {
        base_url: base_url.to_string(),
        timeout: Duration::from_secs(5),
    };
    let gateway: Arc<dyn AssetGateway> = Arc::new(HttpAssetGateway::from_config(&config).unwrap());
    ImageManager::new(parent_id, gateway, GalleryConfig::default())
}

fn ids(manager: &ImageManager) -> Vec<i64> {
    manager.images().iter().map(|a| a.id).collect()
}

#[tokio::test]
async fn full_session_over_http() {
    let base_url = spawn_server().await;
    let manager = manager(&base_url, 3);

    assert!(manager.load_images().await.success);
    assert!(manager.images().is_empty());

    let outcome = manager
        .upload_images(vec![
            UploadFile::new("front.png", "image/png", png_bytes(256)),
            UploadFile::new("inside.jpg", "image/jpeg", jpeg_bytes(256)),
            UploadFile::new("menu.png", "image/png", png_bytes(256)),
        ])
        .await;
    assert!(outcome.success, "upload failed: {}", outcome.message);
    assert_eq!(manager.success().as_deref(), Some("3 images uploaded successfully"));
    assert_eq!(manager.progress(), 0);
    assert!(!manager.uploading());

    let uploaded = ids(&manager);
    assert_eq!(uploaded.len(), 3);
    assert!(manager.images()[0].is_principal);

    // Reorder, then confirm the server agrees by reloading.
    let mut reversed = manager.images();
    reversed.reverse();
    assert!(manager.reorder_images(reversed).await.success);
    let expected: Vec<i64> = uploaded.iter().rev().copied().collect();
    assert_eq!(ids(&manager), expected);

    assert!(manager.mark_as_principal(uploaded[1]).await.success);
    assert!(manager.delete_image(uploaded[0]).await.success);

    assert!(manager.load_images().await.success);
    let images = manager.images();
    assert_eq!(ids(&manager), vec![uploaded[2], uploaded[1]]);
    assert_eq!(images.iter().filter(|a| a.is_principal).count(), 1);
    assert!(images[1].is_principal);
    assert_eq!(images.iter().map(|a| a.order).collect::<Vec<_>>(), vec![0, 1]);
}

#[tokio::test]
async fn server_rejection_surfaces_server_message() {
    let base_url = spawn_server().await;
    let manager = manager(&base_url, 4);

    let outcome = manager
        .upload_images(vec![UploadFile::new(
            "fake.png",
            "image/png",
            b"definitely not a png".to_vec(),
        )])
        .await;

    assert!(!outcome.success);
    let error = manager.error().unwrap();
    assert!(error.contains("fake.png"), "unexpected error: {error}");
    assert!(manager.images().is_empty());
    assert!(!manager.uploading());
}

#[tokio::test]
async fn deleting_missing_image_reports_not_found() {
    let base_url = spawn_server().await;
    let gateway = HttpAssetGateway::new(&base_url);

    let err = gateway.remove(5, 12345).await.unwrap_err();

    match err {
        GatewayError::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Image with id 12345 not found");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_reorder_rolls_back_to_server_order() {
    let base_url = spawn_server().await;
    let manager = manager(&base_url, 6);
    manager
        .upload_images(vec![
            UploadFile::new("a.png", "image/png", png_bytes(64)),
            UploadFile::new("b.png", "image/png", png_bytes(64)),
        ])
        .await;
    let before = ids(&manager);

    // Another session deletes the second image behind this manager's back.
    HttpAssetGateway::new(&base_url)
        .remove(6, before[1])
        .await
        .unwrap();

    let mut reversed = manager.images();
    reversed.reverse();
    let outcome = manager.reorder_images(reversed).await;

    assert!(!outcome.success);
    assert!(manager.error().is_some());
    assert_eq!(ids(&manager), vec![before[0]]);
}

#[tokio::test]
async fn unreachable_server_sets_error_and_keeps_collection() {
    // Bind then drop so nothing is listening on the port.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let manager = manager(&format!("http://{addr}/api/v1"), 1);
    let outcome = manager.load_images().await;

    assert!(!outcome.success);
    assert!(manager.error().is_some());
    assert!(manager.images().is_empty());
}
