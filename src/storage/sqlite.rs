//! SQLite backend.
//!
//! One row per palette in the `palettes` table. Colors are stored as a JSON
//! array in a TEXT column; the favorite flag as INTEGER 0/1.

use async_trait::async_trait;
use sqlx::FromRow;
use swatchbook_models::{ColorPalette, NewPalette, PaletteUpdate};
use tracing::debug;

use super::{PaletteStore, StorageDiagnostics};
use crate::db::{self, DbPool};
use crate::{Error, Result};

const SELECT_COLUMNS: &str = r#"
    SELECT id, name, colors,
           createdAt AS created_at,
           imageUri AS image_uri,
           isFavorite AS is_favorite
    FROM palettes
"#;

#[derive(Debug, FromRow)]
struct PaletteRow {
    id: i64,
    name: String,
    colors: String,
    created_at: String,
    image_uri: Option<String>,
    is_favorite: bool,
}

impl TryFrom<PaletteRow> for ColorPalette {
    type Error = Error;

    fn try_from(row: PaletteRow) -> Result<Self> {
        let colors: Vec<String> = serde_json::from_str(&row.colors).map_err(|e| {
            Error::Storage(format!("Invalid colors for palette {}: {}", row.id, e))
        })?;

        Ok(ColorPalette {
            id: Some(row.id),
            name: row.name,
            colors,
            created_at: row.created_at,
            image_uri: row.image_uri,
            is_favorite: row.is_favorite,
        })
    }
}

/// A value bound into a dynamic UPDATE.
enum Binding {
    Text(String),
    Flag(bool),
}

/// Palette store over a SQLite pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn fetch(&self, filter: &str) -> Result<Vec<ColorPalette>> {
        let query = format!("{} {} ORDER BY createdAt DESC, id DESC", SELECT_COLUMNS, filter);
        let rows = sqlx::query_as::<_, PaletteRow>(&query)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ColorPalette::try_from).collect()
    }

    async fn exists(&self, id: i64) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM palettes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}

fn encode_colors(colors: &[String]) -> Result<String> {
    serde_json::to_string(colors).map_err(|e| Error::Storage(e.to_string()))
}

#[async_trait]
impl PaletteStore for SqliteStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn init(&self) -> Result<()> {
        db::initialize_schema(&self.pool).await
    }

    async fn save_palette(&self, palette: NewPalette) -> Result<i64> {
        let colors = encode_colors(&palette.colors)?;

        let result = sqlx::query(
            r#"
            INSERT INTO palettes (name, colors, createdAt, imageUri, isFavorite)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&palette.name)
        .bind(&colors)
        .bind(&palette.created_at)
        .bind(&palette.image_uri)
        .bind(palette.is_favorite)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, "Palette saved");
        Ok(id)
    }

    async fn get_all_palettes(&self) -> Result<Vec<ColorPalette>> {
        self.fetch("").await
    }

    async fn get_favorite_palettes(&self) -> Result<Vec<ColorPalette>> {
        self.fetch("WHERE isFavorite = 1").await
    }

    async fn get_palette(&self, id: i64) -> Result<Option<ColorPalette>> {
        let query = format!("{} WHERE id = ?", SELECT_COLUMNS);
        let row = sqlx::query_as::<_, PaletteRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(ColorPalette::try_from).transpose()
    }

    async fn update_palette(&self, id: i64, updates: &PaletteUpdate) -> Result<()> {
        let mut columns = Vec::new();
        let mut bindings = Vec::new();

        if let Some(ref name) = updates.name {
            columns.push("name = ?");
            bindings.push(Binding::Text(name.clone()));
        }
        if let Some(ref colors) = updates.colors {
            columns.push("colors = ?");
            bindings.push(Binding::Text(encode_colors(colors)?));
        }
        if let Some(ref image_uri) = updates.image_uri {
            columns.push("imageUri = ?");
            bindings.push(Binding::Text(image_uri.clone()));
        }
        if let Some(is_favorite) = updates.is_favorite {
            columns.push("isFavorite = ?");
            bindings.push(Binding::Flag(is_favorite));
        }

        if columns.is_empty() {
            return if self.exists(id).await? {
                Ok(())
            } else {
                Err(Error::NotFound(format!("Palette not found: {}", id)))
            };
        }

        let query = format!("UPDATE palettes SET {} WHERE id = ?", columns.join(", "));
        let mut q = sqlx::query(&query);
        for binding in bindings {
            q = match binding {
                Binding::Text(value) => q.bind(value),
                Binding::Flag(value) => q.bind(value),
            };
        }

        let result = q.bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Palette not found: {}", id)));
        }

        debug!(id, "Palette updated");
        Ok(())
    }

    async fn delete_palette(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM palettes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Palette not found: {}", id)));
        }

        debug!(id, "Palette deleted");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM palettes").execute(&self.pool).await?;
        Ok(())
    }

    async fn diagnostics(&self) -> Result<StorageDiagnostics> {
        db::health_check(&self.pool).await?;

        let databases: Vec<(i64, String, Option<String>)> =
            sqlx::query_as("PRAGMA database_list")
                .fetch_all(&self.pool)
                .await?;
        let location = databases
            .into_iter()
            .find(|(_, name, _)| name == "main")
            .and_then(|(_, _, file)| file)
            .filter(|file| !file.is_empty())
            .unwrap_or_else(|| ":memory:".to_string());

        let (page_count,): (i64,) = sqlx::query_as("PRAGMA page_count")
            .fetch_one(&self.pool)
            .await?;
        let (page_size,): (i64,) = sqlx::query_as("PRAGMA page_size")
            .fetch_one(&self.pool)
            .await?;

        let checks: Vec<(String,)> = sqlx::query_as("PRAGMA integrity_check")
            .fetch_all(&self.pool)
            .await?;
        let integrity_issues: Vec<String> = checks
            .into_iter()
            .map(|(message,)| message)
            .filter(|message| message != "ok")
            .collect();

        Ok(StorageDiagnostics {
            location,
            size_bytes: (page_count * page_size).max(0) as u64,
            integrity_ok: integrity_issues.is_empty(),
            integrity_issues,
            pool: Some(db::get_pool_stats(&self.pool)),
        })
    }
}
