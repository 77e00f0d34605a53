//! Status Routes
//!
//! Health checks and status endpoints.
//!
//! Routes:
//! - GET /health - Basic health check
//! - GET /status - Storage and extraction configuration summary
//! - GET /status/extraction - Live probe of the extraction API

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use swatchbook_extract::ApiStatus;

use crate::storage::{Platform, StorageDiagnostics};
use crate::AppState;

/// Build status routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/status", get(system_status))
        .route("/status/extraction", get(extraction_status))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// System status response.
#[derive(Debug, Serialize)]
pub struct SystemStatusResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub platform: Platform,
    pub storage: StorageStatus,
    pub extraction: ExtractionSettings,
}

#[derive(Debug, Serialize)]
pub struct StorageStatus {
    pub backend: &'static str,
    pub total_palettes: usize,
    pub favorite_palettes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<StorageDiagnostics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExtractionSettings {
    pub preflight: bool,
    pub credentials_configured: bool,
    pub min_request_interval_ms: u64,
    pub max_retries: u32,
}

// ============================================================================
// Handlers
// ============================================================================

/// Basic health check.
///
/// GET /health
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").into(),
        timestamp: Utc::now(),
    })
}

/// System status.
///
/// GET /status
///
/// A storage failure or a failed integrity check is reported as `degraded`
/// rather than an error response.
async fn system_status(State(state): State<AppState>) -> Json<SystemStatusResponse> {
    let palettes = &state.palettes;

    let (stats, diagnostics) = tokio::join!(palettes.stats(), palettes.diagnostics());
    let mut storage = StorageStatus {
        backend: palettes.backend_name(),
        total_palettes: 0,
        favorite_palettes: 0,
        diagnostics: None,
        error: None,
    };
    let mut errors = Vec::new();

    match stats {
        Ok(stats) => {
            storage.total_palettes = stats.total_palettes;
            storage.favorite_palettes = stats.favorite_palettes;
        }
        Err(e) => errors.push(e.to_string()),
    }
    match diagnostics {
        Ok(diagnostics) => storage.diagnostics = Some(diagnostics),
        Err(e) => errors.push(e.to_string()),
    }
    if !errors.is_empty() {
        storage.error = Some(errors.join("; "));
    }

    let intact = storage
        .diagnostics
        .as_ref()
        .map_or(false, |d| d.integrity_ok);
    let status = if storage.error.is_none() && intact {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    };

    let imagga = &state.config.imagga;
    Json(SystemStatusResponse {
        status,
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        platform: palettes.platform(),
        storage,
        extraction: ExtractionSettings {
            preflight: state.generator.preflight_enabled(),
            credentials_configured: imagga.has_credentials(),
            min_request_interval_ms: imagga.min_request_interval_ms,
            max_retries: imagga.max_retries,
        },
    })
}

/// Probe the extraction API's usage endpoint.
///
/// GET /status/extraction
async fn extraction_status(State(state): State<AppState>) -> Json<ApiStatus> {
    Json(state.generator.extraction_status().await)
}
