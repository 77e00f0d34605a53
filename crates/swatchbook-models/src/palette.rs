//! Palette record and DTOs.

use serde::{Deserialize, Serialize};

/// A named, ordered set of hex colors with metadata.
///
/// Serialized with camelCase keys; this is the shape stored by the blob
/// backend, returned by the API, and written into export documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorPalette {
    /// Assigned by the storage backend; absent until persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub colors: Vec<String>,
    /// RFC 3339 creation time. Never changes after creation.
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
}

impl ColorPalette {
    /// Merge a partial update into this palette.
    ///
    /// Only fields present in `update` change; `id` and `created_at` are
    /// never touched.
    pub fn apply(&mut self, update: &PaletteUpdate) {
        if let Some(ref name) = update.name {
            self.name = name.clone();
        }
        if let Some(ref colors) = update.colors {
            self.colors = colors.clone();
        }
        if let Some(ref image_uri) = update.image_uri {
            self.image_uri = Some(image_uri.clone());
        }
        if let Some(is_favorite) = update.is_favorite {
            self.is_favorite = is_favorite;
        }
    }

    /// Strip the id, e.g. to re-import a palette into another store.
    pub fn to_new(&self) -> NewPalette {
        NewPalette {
            name: self.name.clone(),
            colors: self.colors.clone(),
            created_at: self.created_at.clone(),
            image_uri: self.image_uri.clone(),
            is_favorite: self.is_favorite,
        }
    }
}

/// Input for saving a new palette (everything but the id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPalette {
    pub name: String,
    pub colors: Vec<String>,
    pub created_at: String,
    #[serde(default)]
    pub image_uri: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
}

impl NewPalette {
    /// Attach a backend-assigned id.
    pub fn with_id(self, id: i64) -> ColorPalette {
        ColorPalette {
            id: Some(id),
            name: self.name,
            colors: self.colors,
            created_at: self.created_at,
            image_uri: self.image_uri,
            is_favorite: self.is_favorite,
        }
    }
}

/// Partial update for a palette. Absent fields keep their prior values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

impl PaletteUpdate {
    /// Update that only sets the favorite flag.
    pub fn favorite(is_favorite: bool) -> Self {
        Self {
            is_favorite: Some(is_favorite),
            ..Default::default()
        }
    }

    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.colors.is_none()
            && self.image_uri.is_none()
            && self.is_favorite.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ColorPalette {
        NewPalette {
            name: "A".to_string(),
            colors: vec!["#FF0000".to_string(), "#00FF00".to_string()],
            created_at: "2024-05-01T10:00:00+00:00".to_string(),
            image_uri: None,
            is_favorite: false,
        }
        .with_id(7)
    }

    #[test]
    fn test_apply_only_changes_supplied_fields() {
        let mut palette = sample();
        palette.apply(&PaletteUpdate::favorite(true));

        assert!(palette.is_favorite);
        assert_eq!(palette.id, Some(7));
        assert_eq!(palette.name, "A");
        assert_eq!(palette.colors, vec!["#FF0000", "#00FF00"]);
        assert_eq!(palette.created_at, "2024-05-01T10:00:00+00:00");
    }

    #[test]
    fn test_camel_case_serialization() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["createdAt"], "2024-05-01T10:00:00+00:00");
        assert_eq!(json["isFavorite"], false);
        assert!(json.get("imageUri").is_none());

        let update: PaletteUpdate = serde_json::from_str(r#"{"isFavorite":true}"#).unwrap();
        assert_eq!(update, PaletteUpdate::favorite(true));
        assert!(!update.is_empty());
        assert!(PaletteUpdate::default().is_empty());
    }
}
