//! Generate Routes
//!
//! Palettes derived from images or generated at random. Responses are not
//! saved; clients post the result to `/palettes` if they want to keep it.
//!
//! Routes:
//! - POST /generate/image - Multipart upload, field `image` (optional text field `imageUri`)
//! - POST /generate/library - Extract from an image in the server's image library
//! - POST /generate/url - Extract from a public image URL
//! - POST /generate/random - Random palette

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use swatchbook_extract::ImageSource;
use tracing::debug;

use crate::services::GeneratedPalette;
use crate::{AppState, Error, Result};

/// Multipart field carrying the image.
const IMAGE_FIELD: &str = "image";

/// Optional multipart field with the caller's reference to the image.
const IMAGE_URI_FIELD: &str = "imageUri";

/// Build generate routes.
pub fn routes(state: AppState) -> Router<AppState> {
    let max_size = state.config.upload.max_upload_size;

    Router::new()
        .route("/image", post(generate_from_image))
        .layer(DefaultBodyLimit::max(max_size))
        .route("/library", post(generate_from_library))
        .route("/url", post(generate_from_url))
        .route("/random", post(generate_random))
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct UrlRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct LibraryRequest {
    /// Path relative to the image library.
    pub path: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /generate/image
async fn generate_from_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<GeneratedPalette>> {
    let max_size = state.config.upload.max_upload_size;
    let mut image = None;
    let mut image_uri = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| multipart_error(e, max_size))? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(IMAGE_FIELD) => {
                let filename = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                if let Some(ref ct) = content_type {
                    if !ct.starts_with("image/") && ct != "application/octet-stream" {
                        return Err(Error::InvalidFileType(ct.clone()));
                    }
                }

                let data = field.bytes().await.map_err(|e| multipart_error(e, max_size))?;
                if data.is_empty() {
                    return Err(Error::InvalidInput("Uploaded image is empty".to_string()));
                }
                if data.len() > max_size {
                    return Err(Error::FileTooLarge { max_size });
                }

                debug!(bytes = data.len(), "Received image upload");
                image = Some(ImageSource::from_bytes(data.to_vec(), filename, content_type));
            }
            Some(IMAGE_URI_FIELD) => {
                image_uri = Some(field.text().await.map_err(|e| multipart_error(e, max_size))?);
            }
            _ => continue,
        }
    }

    let image = image.ok_or_else(|| {
        Error::InvalidInput(format!("Missing multipart field '{}'", IMAGE_FIELD))
    })?;

    Ok(Json(state.generator.from_image(image, image_uri).await))
}

/// POST /generate/library
async fn generate_from_library(
    State(state): State<AppState>,
    Json(request): Json<LibraryRequest>,
) -> Result<Json<GeneratedPalette>> {
    let library = &state.config.upload.image_library;
    Ok(Json(state.generator.from_library(library, &request.path).await?))
}

/// POST /generate/url
async fn generate_from_url(
    State(state): State<AppState>,
    Json(request): Json<UrlRequest>,
) -> Result<Json<GeneratedPalette>> {
    let url = request.url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(Error::InvalidInput(
            "url must be an absolute http(s) URL".to_string(),
        ));
    }

    Ok(Json(state.generator.from_url(url).await))
}

/// POST /generate/random
async fn generate_random(State(state): State<AppState>) -> Json<GeneratedPalette> {
    Json(state.generator.random().await)
}

fn multipart_error(err: axum::extract::multipart::MultipartError, max_size: usize) -> Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::FileTooLarge { max_size }
    } else {
        Error::InvalidInput(format!("Invalid multipart body: {}", err.body_text()))
    }
}
