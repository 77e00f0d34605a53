//! Data models for swatchbook.
//!
//! Defines the palette record and its create/update DTOs, hex color
//! normalization, and the export document format shared by the storage
//! backends and the HTTP API.

mod color;
mod export;
mod palette;

pub use color::*;
pub use export::*;
pub use palette::*;

use chrono::Utc;

/// Current UTC timestamp as an RFC 3339 string.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339()
}
