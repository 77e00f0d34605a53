//! Palette generation.
//!
//! Front door for everything that produces colors rather than stores them:
//! extraction from an uploaded image, an image in the server's library or a
//! public URL, and random palettes. Generation never fails once the image
//! has been read; the extraction clients substitute fallback palettes on
//! their own.

use std::path::{Component, Path, PathBuf};

use chrono::Local;
use serde::Serialize;
use swatchbook_extract::{ApiStatus, ColormindClient, ImageSource, ImaggaClient};
use tracing::info;

use crate::{Error, Result};

/// Where a generated palette came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteSource {
    Image,
    Library,
    Url,
    Random,
}

/// A palette ready to be reviewed and saved by the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPalette {
    /// Default display name, e.g. "Palette 2024-05-01 14:32".
    pub suggested_name: String,
    pub colors: Vec<String>,
    pub source: PaletteSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
}

/// Generates palettes through the extraction and random-palette clients.
#[derive(Clone)]
pub struct PaletteGenerator {
    imagga: ImaggaClient,
    colormind: ColormindClient,
}

impl PaletteGenerator {
    pub fn new(imagga: ImaggaClient, colormind: ColormindClient) -> Self {
        Self { imagga, colormind }
    }

    /// Extract from uploaded image bytes.
    ///
    /// `image_uri` is the caller's reference to the image (e.g. a device
    /// file URI); the upload's filename stands in when none is given.
    pub async fn from_image(
        &self,
        image: ImageSource,
        image_uri: Option<String>,
    ) -> GeneratedPalette {
        let colors = self.imagga.generate_palette_from_image(&image).await;
        info!(filename = %image.filename, colors = colors.len(), "Generated palette from image");

        GeneratedPalette {
            suggested_name: suggested_name("Palette"),
            colors,
            source: PaletteSource::Image,
            image_uri: image_uri
                .filter(|uri| !uri.trim().is_empty())
                .or(Some(image.filename)),
        }
    }

    /// Extract from an image stored under `library`.
    ///
    /// `relative` must stay inside the library; unreadable files fail with
    /// [`Error::ImageAccess`].
    pub async fn from_library(&self, library: &Path, relative: &str) -> Result<GeneratedPalette> {
        let path = resolve_in_library(library, relative).await?;
        let image = ImageSource::from_path(&path).await?;

        let colors = self.imagga.generate_palette_from_image(&image).await;
        info!(path = %path.display(), colors = colors.len(), "Generated palette from library image");

        Ok(GeneratedPalette {
            suggested_name: suggested_name("Palette"),
            colors,
            source: PaletteSource::Library,
            image_uri: Some(format!("file://{}", path.display())),
        })
    }

    pub async fn from_url(&self, url: &str) -> GeneratedPalette {
        let colors = self.imagga.extract_colors_from_url(url).await;
        info!(url = %url, colors = colors.len(), "Generated palette from URL");

        GeneratedPalette {
            suggested_name: suggested_name("Palette"),
            colors,
            source: PaletteSource::Url,
            image_uri: Some(url.to_string()),
        }
    }

    pub async fn random(&self) -> GeneratedPalette {
        let colors = self.colormind.random_palette().await;

        GeneratedPalette {
            suggested_name: suggested_name("Random Palette"),
            colors,
            source: PaletteSource::Random,
            image_uri: None,
        }
    }

    pub async fn extraction_status(&self) -> ApiStatus {
        self.imagga.check_api_status().await
    }

    pub fn preflight_enabled(&self) -> bool {
        self.imagga.config().preflight
    }
}

fn suggested_name(prefix: &str) -> String {
    format!("{} {}", prefix, Local::now().format("%Y-%m-%d %H:%M"))
}

async fn resolve_in_library(library: &Path, relative: &str) -> Result<PathBuf> {
    let relative = Path::new(relative.trim());
    let plain = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if relative.as_os_str().is_empty() || !plain {
        return Err(Error::InvalidInput(
            "path must be relative to the image library".to_string(),
        ));
    }

    let access = |target: &Path, e: std::io::Error| {
        Error::ImageAccess(format!("{}: {}", target.display(), e))
    };
    let root = tokio::fs::canonicalize(library)
        .await
        .map_err(|e| access(library, e))?;
    let joined = root.join(relative);
    let path = tokio::fs::canonicalize(&joined)
        .await
        .map_err(|e| access(&joined, e))?;

    // Symlinks may still point outside.
    if !path.starts_with(&root) {
        return Err(Error::ImageAccess(format!(
            "{} is outside the image library",
            relative.display()
        )));
    }
    Ok(path)
}
