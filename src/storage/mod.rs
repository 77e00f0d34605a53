//! Palette storage port.
//!
//! One trait, [`PaletteStore`], with two interchangeable backends:
//! - [`SqliteStore`]: one row per palette in a SQLite table
//! - [`BlobStore`]: the whole collection as a single JSON array in a
//!   key-value store
//!
//! The backend is picked once at startup by [`open_store`] from the
//! configured [`Platform`] and injected through `AppState`. Nothing inspects
//! the platform per call.

pub mod blob;
pub mod kv;
pub mod sqlite;

pub use blob::BlobStore;
pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use sqlite::SqliteStore;

pub use crate::config::Platform;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use swatchbook_models::{ColorPalette, NewPalette, PaletteUpdate};
use tracing::info;

use crate::config::StorageConfig;
use crate::db::{self, PoolStats};
use crate::Result;

/// Where a backend keeps its data, how large it is, and whether it is intact.
#[derive(Debug, Clone, Serialize)]
pub struct StorageDiagnostics {
    /// Database file or blob path (`:memory:` / `memory://` when not on disk).
    pub location: String,
    pub size_bytes: u64,
    pub integrity_ok: bool,
    /// Problems found by the integrity check.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub integrity_issues: Vec<String>,
    /// Connection pool usage, for pooled backends.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool: Option<PoolStats>,
}

/// Persistence operations for palettes.
///
/// Both backends honor the same contract:
/// - `save_palette` returns a fresh id that is unique within the store
/// - `update_palette` merges only the supplied fields; `id` and
///   `created_at` never change
/// - updating or deleting an unknown id fails with `Error::NotFound`
/// - a failed mutation leaves the stored collection as it was
#[async_trait]
pub trait PaletteStore: Send + Sync {
    /// Short identifier for logs and `/status` (e.g. "sqlite").
    fn backend_name(&self) -> &'static str;

    /// Prepare the backend (create tables, seed counters). Idempotent.
    async fn init(&self) -> Result<()>;

    /// Persist a new palette and return its assigned id.
    async fn save_palette(&self, palette: NewPalette) -> Result<i64>;

    async fn get_all_palettes(&self) -> Result<Vec<ColorPalette>>;

    async fn get_favorite_palettes(&self) -> Result<Vec<ColorPalette>>;

    async fn update_palette(&self, id: i64, updates: &PaletteUpdate) -> Result<()>;

    async fn delete_palette(&self, id: i64) -> Result<()>;

    /// Remove every palette.
    async fn clear(&self) -> Result<()>;

    /// Check integrity and report location and size.
    async fn diagnostics(&self) -> Result<StorageDiagnostics>;

    /// Look up one palette.
    async fn get_palette(&self, id: i64) -> Result<Option<ColorPalette>> {
        Ok(self
            .get_all_palettes()
            .await?
            .into_iter()
            .find(|p| p.id == Some(id)))
    }
}

/// Open and initialize the backend for the configured platform.
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn PaletteStore>> {
    let store: Arc<dyn PaletteStore> = match config.platform {
        Platform::Native => {
            let pool = db::init_pool(&config.database_path).await?;
            Arc::new(SqliteStore::new(pool))
        }
        Platform::Web => {
            let kv = FileKeyValueStore::new(&config.blob_path);
            Arc::new(BlobStore::new(Arc::new(kv)))
        }
    };

    store.init().await?;

    info!(
        platform = %config.platform,
        backend = store.backend_name(),
        "Palette storage ready"
    );

    Ok(store)
}
