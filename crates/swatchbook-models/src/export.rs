//! Export document and library statistics.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ColorPalette;

/// Current export format version.
pub const EXPORT_VERSION: &str = "1.0";

/// JSON backup of a palette collection.
///
/// `platform`, `totalPalettes` and `favoritePalettes` are informational and
/// ignored on import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: String,
    pub export_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_palettes: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite_palettes: Option<usize>,
    pub palettes: Vec<ColorPalette>,
}

impl ExportDocument {
    /// Build a document for the given palettes, stamped with the current time.
    pub fn new(palettes: Vec<ColorPalette>, platform: Option<String>) -> Self {
        let favorites = palettes.iter().filter(|p| p.is_favorite).count();
        Self {
            version: EXPORT_VERSION.to_string(),
            export_date: crate::now_iso(),
            platform,
            total_palettes: Some(palettes.len()),
            favorite_palettes: Some(favorites),
            palettes,
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a previously exported document.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Aggregate numbers about a palette library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteStats {
    pub total_palettes: usize,
    pub favorite_palettes: usize,
    pub oldest_palette: Option<String>,
    pub newest_palette: Option<String>,
    /// Up to five colors, most frequent first.
    pub most_used_colors: Vec<String>,
}

impl PaletteStats {
    pub fn from_palettes(palettes: &[ColorPalette]) -> Self {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        // First-seen position breaks ties so the ordering is stable.
        let mut first_seen: HashMap<&str, usize> = HashMap::new();
        for color in palettes.iter().flat_map(|p| p.colors.iter()) {
            let next = first_seen.len();
            first_seen.entry(color.as_str()).or_insert(next);
            *counts.entry(color.as_str()).or_insert(0) += 1;
        }

        let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(first_seen[a.0].cmp(&first_seen[b.0])));

        let mut dates: Vec<&str> = palettes.iter().map(|p| p.created_at.as_str()).collect();
        dates.sort_unstable();

        Self {
            total_palettes: palettes.len(),
            favorite_palettes: palettes.iter().filter(|p| p.is_favorite).count(),
            oldest_palette: dates.first().map(|d| d.to_string()),
            newest_palette: dates.last().map(|d| d.to_string()),
            most_used_colors: ranked
                .into_iter()
                .take(5)
                .map(|(c, _)| c.to_string())
                .collect(),
        }
    }
}
