//! API Integration Tests for the Swatchbook server
//!
//! Drives the router with axum-test. Storage is in-memory; the extraction
//! and random-palette APIs are wiremock servers or unreachable addresses.

mod common;

use axum::body::Bytes;
use axum::http::StatusCode;
use std::sync::Arc;

use axum_test::TestServer;
use common::{build_test_app, build_test_app_with, test_config, test_generator, UNREACHABLE};
use serde_json::{json, Value};
use swatchbook::storage::blob::STORAGE_KEY;
use swatchbook::storage::{BlobStore, KeyValueStore, MemoryKeyValueStore, Platform};
use swatchbook::AppState;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BOUNDARY: &str = "swatchbook-test-boundary";

fn multipart_body(field: &str, filename: &str, content_type: &str, data: &[u8]) -> Bytes {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    Bytes::from(body)
}

/// Image part followed by an `imageUri` text part.
fn multipart_body_with_uri(filename: &str, data: &[u8], image_uri: &str) -> Bytes {
    let mut body = multipart_body("image", filename, "image/jpeg", data).to_vec();
    // Drop the closing boundary and append another part.
    body.truncate(body.len() - format!("--{BOUNDARY}--\r\n").len());
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"imageUri\"\r\n\r\n");
    body.extend_from_slice(image_uri.as_bytes());
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    Bytes::from(body)
}

fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

// ============================================================================
// Status
// ============================================================================

#[tokio::test]
async fn test_health_check_returns_healthy() {
    let server = build_test_app().await;

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_status_reports_backend() {
    let server = build_test_app().await;

    let body: Value = server.get("/status").await.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["platform"], "native");
    assert_eq!(body["storage"]["backend"], "sqlite");
    assert_eq!(body["storage"]["total_palettes"], 0);
    assert_eq!(body["extraction"]["preflight"], true);

    let web = build_test_app_with(test_config(Platform::Web, UNREACHABLE, UNREACHABLE)).await;
    let body: Value = web.get("/status").await.json();
    assert_eq!(body["storage"]["backend"], "blob");
    assert_eq!(body["extraction"]["preflight"], false);
}

#[tokio::test]
async fn test_status_includes_storage_diagnostics() {
    let server = build_test_app().await;

    let body: Value = server.get("/status").await.json();
    let diagnostics = &body["storage"]["diagnostics"];
    assert_eq!(diagnostics["location"], ":memory:");
    assert_eq!(diagnostics["integrity_ok"], true);
    assert!(diagnostics["size_bytes"].as_u64().unwrap() > 0);
    assert_eq!(diagnostics["pool"]["max_connections"], 1);

    let web = build_test_app_with(test_config(Platform::Web, UNREACHABLE, UNREACHABLE)).await;
    let body: Value = web.get("/status").await.json();
    let diagnostics = &body["storage"]["diagnostics"];
    assert_eq!(diagnostics["location"], "memory://colorpalettes");
    assert!(diagnostics.get("pool").is_none());
}

#[tokio::test]
async fn test_status_degraded_when_blob_is_corrupt() {
    let kv = Arc::new(MemoryKeyValueStore::new());
    kv.set_item(STORAGE_KEY, "{not json").await.unwrap();
    let config = test_config(Platform::Web, UNREACHABLE, UNREACHABLE);
    let generator = test_generator(&config);
    let state = AppState::from_parts(config, Arc::new(BlobStore::new(kv)), generator);
    let server = TestServer::new(swatchbook::app(state)).unwrap();

    let response = server.get("/status").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["storage"]["diagnostics"]["integrity_ok"], false);
    assert!(body["storage"]["diagnostics"]["integrity_issues"][0]
        .as_str()
        .unwrap()
        .contains("Corrupt palette blob"));
}

#[tokio::test]
async fn test_extraction_status_when_api_unreachable() {
    let server = build_test_app().await;

    let response = server.get("/status/extraction").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["isWorking"], false);
    assert!(body["error"].is_string());
}

// ============================================================================
// Palettes
// ============================================================================

#[tokio::test]
async fn test_create_and_list_palette() {
    let server = build_test_app().await;

    let response = server
        .post("/palettes")
        .json(&json!({ "name": "Sunset", "colors": ["#ff0000", "00ff00"] }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: Value = response.json();
    assert!(created["id"].is_i64());
    assert_eq!(created["colors"], json!(["#FF0000", "#00FF00"]));
    assert_eq!(created["isFavorite"], false);
    assert!(created["createdAt"].is_string());

    let list: Value = server.get("/palettes").await.json();
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["name"], "Sunset");
}

#[tokio::test]
async fn test_create_rejects_invalid_color() {
    let server = build_test_app().await;

    let response = server
        .post("/palettes")
        .json(&json!({ "name": "Bad", "colors": ["#12345"] }))
        .await;
    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_update_toggle_and_delete() {
    let server = build_test_app().await;

    let created: Value = server
        .post("/palettes")
        .json(&json!({ "name": "A", "colors": ["#FF0000"] }))
        .await
        .json();
    let id = created["id"].as_i64().unwrap();

    let updated: Value = server
        .patch(&format!("/palettes/{id}"))
        .json(&json!({ "name": "B" }))
        .await
        .json();
    assert_eq!(updated["name"], "B");
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let toggled: Value = server
        .post(&format!("/palettes/{id}/favorite"))
        .await
        .json();
    assert_eq!(toggled["isFavorite"], true);

    let favorites: Value = server.get("/palettes/favorites").await.json();
    assert_eq!(favorites[0]["id"], id);

    server
        .delete(&format!("/palettes/{id}"))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .get(&format!("/palettes/{id}"))
        .await
        .assert_status_not_found();
    server
        .delete(&format!("/palettes/{id}"))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_search_stats_and_samples() {
    let server = build_test_app().await;

    server
        .post("/palettes/samples")
        .await
        .assert_status(StatusCode::CREATED);

    let results: Value = server
        .get("/palettes/search")
        .add_query_param("q", "ocean")
        .await
        .json();
    assert_eq!(results.as_array().unwrap().len(), 1);
    assert_eq!(results[0]["name"], "Ocean Deep");

    let stats: Value = server.get("/palettes/stats").await.json();
    assert_eq!(stats["totalPalettes"], 4);
    assert_eq!(stats["favoritePalettes"], 2);

    server
        .delete("/palettes")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let list: Value = server.get("/palettes").await.json();
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_export_then_import() {
    let source = build_test_app().await;
    source.post("/palettes/samples").await;

    let response = source.get("/palettes/export").await;
    response.assert_status_ok();
    let document: Value = response.json();
    assert_eq!(document["version"], "1.0");
    assert_eq!(document["platform"], "native");
    assert_eq!(document["palettes"].as_array().unwrap().len(), 4);

    let target = build_test_app_with(test_config(Platform::Web, UNREACHABLE, UNREACHABLE)).await;
    let response = target.post("/palettes/import").json(&document).await;
    response.assert_status(StatusCode::CREATED);
    let summary: Value = response.json();
    assert_eq!(summary["imported"], 4);

    let list: Value = target.get("/palettes").await.json();
    assert_eq!(list.as_array().unwrap().len(), 4);
}

// ============================================================================
// Generation
// ============================================================================

#[tokio::test]
async fn test_generate_from_image_uses_extraction_api() {
    let imagga = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/uploads"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "result": { "upload_id": "u1" } })),
        )
        .mount(&imagga)
        .await;
    Mock::given(method("GET"))
        .and(path("/colors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": { "colors": { "image_colors": [
                { "html_code": "#0a0b0c" }, { "html_code": "#d0e0f0" }
            ] } }
        })))
        .mount(&imagga)
        .await;

    let server =
        build_test_app_with(test_config(Platform::Web, &imagga.uri(), UNREACHABLE)).await;

    let response = server
        .post("/generate/image")
        .content_type(&multipart_content_type())
        .bytes(multipart_body("image", "photo.jpg", "image/jpeg", b"jpegdata"))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["colors"], json!(["#0A0B0C", "#D0E0F0"]));
    assert_eq!(body["source"], "image");
    assert_eq!(body["imageUri"], "photo.jpg");
    assert!(body["suggestedName"].as_str().unwrap().starts_with("Palette "));
}

#[tokio::test]
async fn test_generate_from_image_keeps_caller_image_uri() {
    let server = build_test_app().await;

    let response = server
        .post("/generate/image")
        .content_type(&multipart_content_type())
        .bytes(multipart_body_with_uri(
            "photo.jpg",
            b"jpegdata",
            "file:///DCIM/Camera/IMG_0042.jpg",
        ))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["imageUri"], "file:///DCIM/Camera/IMG_0042.jpg");
}

#[tokio::test]
async fn test_generate_from_library_image() {
    let library = tempfile::tempdir().unwrap();
    tokio::fs::create_dir(library.path().join("trips")).await.unwrap();
    tokio::fs::write(library.path().join("trips").join("coast.jpg"), b"jpegdata")
        .await
        .unwrap();

    let mut config = test_config(Platform::Native, UNREACHABLE, UNREACHABLE);
    config.upload.image_library = library.path().to_path_buf();
    let server = build_test_app_with(config).await;

    let response = server
        .post("/generate/library")
        .json(&json!({ "path": "trips/coast.jpg" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["source"], "library");
    let image_uri = body["imageUri"].as_str().unwrap();
    assert!(image_uri.starts_with("file://"));
    assert!(image_uri.ends_with("coast.jpg"));
    assert!(!body["colors"].as_array().unwrap().is_empty());

    let response = server
        .post("/generate/library")
        .json(&json!({ "path": "trips/missing.jpg" }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "IMAGE_ACCESS_DENIED");

    server
        .post("/generate/library")
        .json(&json!({ "path": "../outside.jpg" }))
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_generate_from_image_falls_back_when_api_down() {
    let server = build_test_app().await;

    let response = server
        .post("/generate/image")
        .content_type(&multipart_content_type())
        .bytes(multipart_body("image", "photo.png", "image/png", b"pngdata"))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let colors = body["colors"].as_array().unwrap();
    assert!((1..=6).contains(&colors.len()));
}

#[tokio::test]
async fn test_generate_from_image_requires_image_field() {
    let server = build_test_app().await;

    let response = server
        .post("/generate/image")
        .content_type(&multipart_content_type())
        .bytes(multipart_body("file", "photo.png", "image/png", b"pngdata"))
        .await;
    response.assert_status_bad_request();

    let response = server
        .post("/generate/image")
        .content_type(&multipart_content_type())
        .bytes(multipart_body("image", "notes.txt", "text/plain", b"hello"))
        .await;
    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_FILE_TYPE");
}

#[tokio::test]
async fn test_generate_from_url_validates_input() {
    let server = build_test_app().await;

    server
        .post("/generate/url")
        .json(&json!({ "url": "ftp://example.com/a.jpg" }))
        .await
        .assert_status_bad_request();

    let response = server
        .post("/generate/url")
        .json(&json!({ "url": "https://example.com/a.jpg" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["source"], "url");
    assert_eq!(body["imageUri"], "https://example.com/a.jpg");
}

#[tokio::test]
async fn test_generate_random_uses_colormind() {
    let colormind = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [[1, 2, 3], [4, 5, 6], [7, 8, 9], [10, 11, 12], [13, 14, 15]]
        })))
        .mount(&colormind)
        .await;

    let server = build_test_app_with(test_config(
        Platform::Native,
        UNREACHABLE,
        &format!("{}/api/", colormind.uri()),
    ))
    .await;

    let body: Value = server.post("/generate/random").await.json();
    assert_eq!(
        body["colors"],
        json!(["#010203", "#040506", "#070809", "#0A0B0C", "#0D0E0F"])
    );
    assert!(body["suggestedName"]
        .as_str()
        .unwrap()
        .starts_with("Random Palette "));
}
