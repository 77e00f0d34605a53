//! Palette Routes
//!
//! The saved palette library.
//!
//! Routes:
//! - GET /palettes - List palettes
//! - POST /palettes - Create a palette
//! - DELETE /palettes - Delete every palette
//! - GET /palettes/favorites - List favorite palettes
//! - GET /palettes/search?q= - Search by name or color
//! - GET /palettes/stats - Library statistics
//! - GET /palettes/export - Export document
//! - POST /palettes/import - Import an export document
//! - POST /palettes/samples - Insert demo palettes
//! - GET /palettes/:id - Get one palette
//! - PATCH /palettes/:id - Partial update
//! - DELETE /palettes/:id - Delete one palette
//! - POST /palettes/:id/favorite - Toggle the favorite flag

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use swatchbook_models::{ColorPalette, ExportDocument, PaletteStats, PaletteUpdate};

use crate::services::{CreatePalette, ImportSummary};
use crate::{AppState, Result};

/// Build palette routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_palettes)
                .post(create_palette)
                .delete(clear_palettes),
        )
        .route("/favorites", get(list_favorites))
        .route("/search", get(search_palettes))
        .route("/stats", get(palette_stats))
        .route("/export", get(export_palettes))
        .route("/import", post(import_palettes))
        .route("/samples", post(insert_samples))
        .route(
            "/:id",
            get(get_palette).patch(update_palette).delete(delete_palette),
        )
        .route("/:id/favorite", post(toggle_favorite))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for search.
#[derive(Debug, Deserialize, Default)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

// ============================================================================
// Handlers
// ============================================================================

async fn list_palettes(State(state): State<AppState>) -> Result<Json<Vec<ColorPalette>>> {
    Ok(Json(state.palettes.list().await?))
}

async fn create_palette(
    State(state): State<AppState>,
    Json(input): Json<CreatePalette>,
) -> Result<(StatusCode, Json<ColorPalette>)> {
    let palette = state.palettes.create_palette(input).await?;
    Ok((StatusCode::CREATED, Json(palette)))
}

async fn clear_palettes(State(state): State<AppState>) -> Result<StatusCode> {
    state.palettes.clear_all().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_favorites(State(state): State<AppState>) -> Result<Json<Vec<ColorPalette>>> {
    Ok(Json(state.palettes.favorites().await?))
}

async fn search_palettes(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<ColorPalette>>> {
    Ok(Json(state.palettes.search_palettes(&query.q).await?))
}

async fn palette_stats(State(state): State<AppState>) -> Result<Json<PaletteStats>> {
    Ok(Json(state.palettes.stats().await?))
}

/// GET /palettes/export
///
/// Served as a download named after the export date.
async fn export_palettes(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let document = state.palettes.export_all().await?;
    let date = document.export_date.get(..10).unwrap_or("export").to_string();
    let disposition = format!("attachment; filename=\"swatchbook-{}.json\"", date);

    Ok(([(header::CONTENT_DISPOSITION, disposition)], Json(document)))
}

async fn import_palettes(
    State(state): State<AppState>,
    Json(document): Json<ExportDocument>,
) -> Result<(StatusCode, Json<ImportSummary>)> {
    let summary = state.palettes.import(document).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

async fn insert_samples(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Vec<ColorPalette>>)> {
    let created = state.palettes.insert_sample_data().await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_palette(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ColorPalette>> {
    Ok(Json(state.palettes.get(id).await?))
}

async fn update_palette(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(updates): Json<PaletteUpdate>,
) -> Result<Json<ColorPalette>> {
    Ok(Json(state.palettes.update(id, updates).await?))
}

async fn delete_palette(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    state.palettes.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle_favorite(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ColorPalette>> {
    Ok(Json(state.palettes.toggle_favorite(id).await?))
}
