//! Palette library service.
//!
//! Sits between the API and the storage port. Validates and normalizes
//! input, stamps creation times, and implements the collection-level
//! operations (search, stats, export/import, sample data) on top of the
//! backend's CRUD primitives.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use swatchbook_models::{
    normalize_hex, now_iso, ColorPalette, ExportDocument, NewPalette, PaletteStats, PaletteUpdate,
};
use tracing::{debug, info};

use crate::storage::{PaletteStore, Platform, StorageDiagnostics};
use crate::{Error, Result};

/// Input for creating a palette; the creation time is stamped by the service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePalette {
    pub name: String,
    pub colors: Vec<String>,
    #[serde(default)]
    pub image_uri: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
}

/// Result of importing an export document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub imported: usize,
    pub ids: Vec<i64>,
}

const SAMPLE_PALETTES: &[(&str, [&str; 5], bool)] = &[
    ("Sunset Vibes", ["#FF6B35", "#F7931E", "#FFD23F", "#06FFA5", "#4D9DE0"], true),
    ("Ocean Deep", ["#006A6B", "#0E8388", "#2E8B57", "#5F9EA0", "#87CEEB"], false),
    ("Neon Dreams", ["#FF1744", "#E91E63", "#9C27B0", "#673AB7", "#3F51B5"], true),
    ("Forest Harmony", ["#2E7D32", "#388E3C", "#43A047", "#4CAF50", "#66BB6A"], false),
];

/// Service for the palette library.
#[derive(Clone)]
pub struct PaletteService {
    store: Arc<dyn PaletteStore>,
    platform: Platform,
}

impl PaletteService {
    pub fn new(store: Arc<dyn PaletteStore>, platform: Platform) -> Self {
        Self { store, platform }
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Create a palette stamped with the current time.
    pub async fn create_palette(&self, input: CreatePalette) -> Result<ColorPalette> {
        self.save_palette(NewPalette {
            name: input.name,
            colors: input.colors,
            created_at: now_iso(),
            image_uri: input.image_uri,
            is_favorite: input.is_favorite,
        })
        .await
    }

    /// Validate and persist a palette, keeping its `created_at`.
    pub async fn save_palette(&self, palette: NewPalette) -> Result<ColorPalette> {
        let palette = validate_new(palette)?;
        let id = self.store.save_palette(palette.clone()).await?;

        info!(id, name = %palette.name, colors = palette.colors.len(), "Palette created");
        Ok(palette.with_id(id))
    }

    pub async fn list(&self) -> Result<Vec<ColorPalette>> {
        self.store.get_all_palettes().await
    }

    pub async fn favorites(&self) -> Result<Vec<ColorPalette>> {
        self.store.get_favorite_palettes().await
    }

    pub async fn get(&self, id: i64) -> Result<ColorPalette> {
        self.store
            .get_palette(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Palette not found: {}", id)))
    }

    /// Apply a partial update and return the resulting palette.
    pub async fn update(&self, id: i64, updates: PaletteUpdate) -> Result<ColorPalette> {
        let updates = validate_update(updates)?;
        self.store.update_palette(id, &updates).await?;
        debug!(id, "Palette updated");
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.store.delete_palette(id).await?;
        info!(id, "Palette deleted");
        Ok(())
    }

    /// Flip the favorite flag.
    pub async fn toggle_favorite(&self, id: i64) -> Result<ColorPalette> {
        let current = self.get(id).await?;
        self.store
            .update_palette(id, &PaletteUpdate::favorite(!current.is_favorite))
            .await?;
        self.get(id).await
    }

    /// Palettes whose name or any color contains `query`, case-insensitive.
    /// An empty query matches everything.
    pub async fn search_palettes(&self, query: &str) -> Result<Vec<ColorPalette>> {
        let needle = query.trim().to_lowercase();
        let palettes = self.list().await?;
        if needle.is_empty() {
            return Ok(palettes);
        }

        Ok(palettes
            .into_iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.colors.iter().any(|c| c.to_lowercase().contains(&needle))
            })
            .collect())
    }

    pub async fn stats(&self) -> Result<PaletteStats> {
        let palettes = self.list().await?;
        Ok(PaletteStats::from_palettes(&palettes))
    }

    /// Integrity, location and size of the backing store.
    pub async fn diagnostics(&self) -> Result<StorageDiagnostics> {
        self.store.diagnostics().await
    }

    /// Snapshot of the whole library.
    pub async fn export_all(&self) -> Result<ExportDocument> {
        let palettes = self.list().await?;
        info!(count = palettes.len(), "Exporting palettes");
        Ok(ExportDocument::new(
            palettes,
            Some(self.platform.as_str().to_string()),
        ))
    }

    /// Save every palette of an export document as a new palette.
    ///
    /// Ids are reassigned by the backend; names, colors, creation times and
    /// favorite flags are kept. The whole document is validated before
    /// anything is written.
    pub async fn import(&self, document: ExportDocument) -> Result<ImportSummary> {
        let palettes = document
            .palettes
            .iter()
            .map(|p| validate_new(p.to_new()))
            .collect::<Result<Vec<_>>>()?;

        let mut ids = Vec::with_capacity(palettes.len());
        for palette in palettes {
            ids.push(self.store.save_palette(palette).await?);
        }

        info!(count = ids.len(), version = %document.version, "Imported palettes");
        Ok(ImportSummary {
            imported: ids.len(),
            ids,
        })
    }

    pub async fn clear_all(&self) -> Result<()> {
        self.store.clear().await?;
        info!("Palette library cleared");
        Ok(())
    }

    /// Insert a handful of demo palettes.
    pub async fn insert_sample_data(&self) -> Result<Vec<ColorPalette>> {
        let mut created = Vec::with_capacity(SAMPLE_PALETTES.len());
        for (name, colors, is_favorite) in SAMPLE_PALETTES {
            created.push(
                self.create_palette(CreatePalette {
                    name: name.to_string(),
                    colors: colors.iter().map(|c| c.to_string()).collect(),
                    image_uri: None,
                    is_favorite: *is_favorite,
                })
                .await?,
            );
        }
        info!(count = created.len(), "Sample palettes inserted");
        Ok(created)
    }
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation("Palette name must not be empty".to_string()));
    }
    Ok(name.to_string())
}

fn validate_colors(colors: &[String]) -> Result<Vec<String>> {
    colors
        .iter()
        .map(|c| normalize_hex(c).map_err(Error::from))
        .collect()
}

fn validate_new(palette: NewPalette) -> Result<NewPalette> {
    Ok(NewPalette {
        name: validate_name(&palette.name)?,
        colors: validate_colors(&palette.colors)?,
        ..palette
    })
}

fn validate_update(updates: PaletteUpdate) -> Result<PaletteUpdate> {
    Ok(PaletteUpdate {
        name: updates.name.as_deref().map(validate_name).transpose()?,
        colors: updates
            .colors
            .as_deref()
            .map(validate_colors)
            .transpose()?,
        ..updates
    })
}
