//! Images submitted for extraction.

use std::io::ErrorKind;
use std::path::Path;

use crate::{Error, Result};

const DEFAULT_FILENAME: &str = "palette_image.jpg";
const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

/// Image bytes plus the metadata needed for a multipart upload.
///
/// Lives only for the duration of one extraction request.
#[derive(Debug, Clone)]
pub struct ImageSource {
    pub data: Vec<u8>,
    pub filename: String,
    pub content_type: String,
}

impl ImageSource {
    /// Wrap raw bytes, e.g. from an uploaded form field.
    pub fn from_bytes(
        data: Vec<u8>,
        filename: Option<String>,
        content_type: Option<String>,
    ) -> Self {
        let filename = filename
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| DEFAULT_FILENAME.to_string());
        let content_type = content_type
            .filter(|c| c.starts_with("image/"))
            .unwrap_or_else(|| guess_content_type(&filename));

        Self {
            data,
            filename,
            content_type,
        }
    }

    /// Read an image from disk.
    ///
    /// Any read failure, including a permission error, is reported as
    /// [`Error::ImageAccess`] so the caller can abort and tell the user.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await.map_err(|e| {
            let reason = match e.kind() {
                ErrorKind::PermissionDenied => "permission denied",
                ErrorKind::NotFound => "not found",
                _ => "unreadable",
            };
            Error::ImageAccess(format!("{} ({}): {}", path.display(), reason, e))
        })?;

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| DEFAULT_FILENAME.to_string());

        Ok(Self::from_bytes(data, Some(filename), None))
    }
}

fn guess_content_type(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first()
        .filter(|m| m.type_().as_str() == "image")
        .map(|m| m.to_string())
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string())
}
