//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum_test::TestServer;
use swatchbook::config::{
    ColormindSettings, Config, ImaggaSettings, Platform, ServerConfig, StorageConfig, UploadConfig,
};
use swatchbook::services::PaletteGenerator;
use swatchbook::storage::{
    BlobStore, FileKeyValueStore, MemoryKeyValueStore, PaletteStore, SqliteStore,
};
use swatchbook::{db, AppState};
use swatchbook_extract::{ColormindClient, ImaggaClient};
use swatchbook_models::NewPalette;

/// Nothing listens here; requests fail fast with connection refused.
pub const UNREACHABLE: &str = "http://127.0.0.1:9";

// ============================================================================
// Storage
// ============================================================================

pub async fn sqlite_store() -> Arc<dyn PaletteStore> {
    let pool = db::init_pool(":memory:")
        .await
        .expect("Failed to create test database");
    let store = SqliteStore::new(pool);
    store.init().await.expect("Failed to initialize schema");
    Arc::new(store)
}

pub async fn blob_store() -> Arc<dyn PaletteStore> {
    let store = BlobStore::new(Arc::new(MemoryKeyValueStore::new()));
    store.init().await.expect("Failed to initialize blob store");
    Arc::new(store)
}

/// Blob backend persisted as files under `dir`.
pub async fn file_blob_store(dir: &Path) -> Arc<dyn PaletteStore> {
    let store = BlobStore::new(Arc::new(FileKeyValueStore::new(dir)));
    store.init().await.expect("Failed to initialize blob store");
    Arc::new(store)
}

/// Both backends, labelled for assertion messages.
pub async fn all_backends() -> Vec<(&'static str, Arc<dyn PaletteStore>)> {
    vec![("sqlite", sqlite_store().await), ("blob", blob_store().await)]
}

pub fn new_palette(name: &str, colors: &[&str], created_at: &str) -> NewPalette {
    NewPalette {
        name: name.to_string(),
        colors: colors.iter().map(|c| c.to_string()).collect(),
        created_at: created_at.to_string(),
        image_uri: None,
        is_favorite: false,
    }
}

// ============================================================================
// Application
// ============================================================================

pub fn test_config(platform: Platform, imagga_url: &str, colormind_url: &str) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        storage: StorageConfig {
            platform,
            database_path: ":memory:".to_string(),
            blob_path: String::new(),
        },
        imagga: ImaggaSettings {
            base_url: imagga_url.to_string(),
            api_key: "test-key".to_string(),
            api_secret: "test-secret".to_string(),
            min_request_interval_ms: 5,
            max_retries: 1,
            retry_base_delay_ms: 5,
        },
        colormind: ColormindSettings {
            url: colormind_url.to_string(),
        },
        upload: UploadConfig {
            max_upload_size: 1024 * 1024,
            image_library: std::env::temp_dir().join("swatchbook-no-library"),
        },
    }
}

pub fn test_generator(config: &Config) -> PaletteGenerator {
    let imagga = ImaggaClient::new(config.imagga.client_config(config.storage.platform))
        .expect("Failed to build extraction client");
    let colormind =
        ColormindClient::new(config.colormind.url.clone()).expect("Failed to build random client");
    PaletteGenerator::new(imagga, colormind)
}

/// Test server over an in-memory backend for the given platform.
pub async fn build_test_app_with(config: Config) -> TestServer {
    let store = match config.storage.platform {
        Platform::Native => sqlite_store().await,
        Platform::Web => blob_store().await,
    };
    let generator = test_generator(&config);
    let state = AppState::from_parts(config, store, generator);

    TestServer::new(swatchbook::app(state)).expect("Failed to create test server")
}

/// Test server with unreachable external APIs.
pub async fn build_test_app() -> TestServer {
    build_test_app_with(test_config(Platform::Native, UNREACHABLE, UNREACHABLE)).await
}
