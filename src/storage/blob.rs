//! Key-value blob backend.
//!
//! The whole collection lives under one key as a JSON array of palettes in
//! insertion order. Every mutation is a read-modify-write of that array.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use swatchbook_models::{ColorPalette, NewPalette, PaletteUpdate};
use tracing::{debug, warn};

use super::{KeyValueStore, PaletteStore, StorageDiagnostics};
use crate::{Error, Result};

/// Key holding the palette array.
pub const STORAGE_KEY: &str = "colorpalettes";

/// Palette store over a [`KeyValueStore`].
///
/// Ids are millisecond timestamps made strictly monotonic: a new id is
/// `max(now_ms, last_id + 1)`, where `last_id` starts at the highest id
/// already stored.
pub struct BlobStore {
    kv: Arc<dyn KeyValueStore>,
    last_id: Mutex<i64>,
}

impl BlobStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            last_id: Mutex::new(0),
        }
    }

    /// Read the array, failing on unreadable or corrupt data.
    async fn load(&self) -> Result<Vec<ColorPalette>> {
        match self.kv.get_item(STORAGE_KEY).await? {
            None => Ok(Vec::new()),
            Some(raw) => parse(&raw),
        }
    }

    /// Read the array for listing; failures degrade to an empty list.
    async fn load_or_empty(&self) -> Vec<ColorPalette> {
        match self.load().await {
            Ok(palettes) => palettes,
            Err(e) => {
                warn!(error = %e, "Failed to read palettes, returning empty list");
                Vec::new()
            }
        }
    }

    async fn store(&self, palettes: &[ColorPalette]) -> Result<()> {
        let raw = serde_json::to_string(palettes)
            .map_err(|e| Error::Storage(format!("Failed to encode palettes: {}", e)))?;
        self.kv.set_item(STORAGE_KEY, &raw).await
    }

    fn next_id(&self, stored_max: i64) -> Result<i64> {
        let mut last = self
            .last_id
            .lock()
            .map_err(|_| Error::Storage("id counter lock poisoned".to_string()))?;
        let id = Utc::now()
            .timestamp_millis()
            .max(*last + 1)
            .max(stored_max + 1);
        *last = id;
        Ok(id)
    }

    fn seed_counter(&self, palettes: &[ColorPalette]) -> Result<()> {
        let stored_max = max_id(palettes);
        let mut last = self
            .last_id
            .lock()
            .map_err(|_| Error::Storage("id counter lock poisoned".to_string()))?;
        *last = (*last).max(stored_max);
        Ok(())
    }
}

fn parse(raw: &str) -> Result<Vec<ColorPalette>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw).map_err(|e| Error::Storage(format!("Corrupt palette blob: {}", e)))
}

/// Problems with a stored array: undecodable, or records without a unique id.
fn integrity_issues(raw: &str) -> Vec<String> {
    let palettes = match parse(raw) {
        Ok(palettes) => palettes,
        Err(e) => return vec![e.to_string()],
    };

    let mut issues = Vec::new();
    let mut seen = HashSet::new();
    for (index, palette) in palettes.iter().enumerate() {
        match palette.id {
            None => issues.push(format!("Palette at index {} has no id", index)),
            Some(id) if !seen.insert(id) => issues.push(format!("Duplicate palette id {}", id)),
            Some(_) => {}
        }
    }
    issues
}

fn max_id(palettes: &[ColorPalette]) -> i64 {
    palettes.iter().filter_map(|p| p.id).max().unwrap_or(0)
}

#[async_trait]
impl PaletteStore for BlobStore {
    fn backend_name(&self) -> &'static str {
        "blob"
    }

    async fn init(&self) -> Result<()> {
        let palettes = self.load_or_empty().await;
        self.seed_counter(&palettes)?;
        debug!(count = palettes.len(), "Blob palette store initialized");
        Ok(())
    }

    async fn save_palette(&self, palette: NewPalette) -> Result<i64> {
        let mut palettes = self.load().await?;
        let id = self.next_id(max_id(&palettes))?;

        palettes.push(palette.with_id(id));
        self.store(&palettes).await?;

        debug!(id, "Palette saved");
        Ok(id)
    }

    async fn get_all_palettes(&self) -> Result<Vec<ColorPalette>> {
        Ok(self.load_or_empty().await)
    }

    async fn get_favorite_palettes(&self) -> Result<Vec<ColorPalette>> {
        Ok(self
            .load_or_empty()
            .await
            .into_iter()
            .filter(|p| p.is_favorite)
            .collect())
    }

    async fn update_palette(&self, id: i64, updates: &PaletteUpdate) -> Result<()> {
        let mut palettes = self.load().await?;
        let palette = palettes
            .iter_mut()
            .find(|p| p.id == Some(id))
            .ok_or_else(|| Error::NotFound(format!("Palette not found: {}", id)))?;

        if updates.is_empty() {
            return Ok(());
        }

        palette.apply(updates);
        self.store(&palettes).await?;

        debug!(id, "Palette updated");
        Ok(())
    }

    async fn delete_palette(&self, id: i64) -> Result<()> {
        let mut palettes = self.load().await?;
        let before = palettes.len();
        palettes.retain(|p| p.id != Some(id));

        if palettes.len() == before {
            return Err(Error::NotFound(format!("Palette not found: {}", id)));
        }

        self.store(&palettes).await?;

        debug!(id, "Palette deleted");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.kv.remove_item(STORAGE_KEY).await
    }

    async fn diagnostics(&self) -> Result<StorageDiagnostics> {
        let raw = self.kv.get_item(STORAGE_KEY).await?.unwrap_or_default();
        let integrity_issues = integrity_issues(&raw);

        Ok(StorageDiagnostics {
            location: self.kv.location(STORAGE_KEY),
            size_bytes: raw.len() as u64,
            integrity_ok: integrity_issues.is_empty(),
            integrity_issues,
            pool: None,
        })
    }
}
