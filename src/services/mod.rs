//! Service layer for Swatchbook.
//!
//! - [`PaletteService`]: the palette library (validation, CRUD, search,
//!   statistics, export/import) over the configured storage backend
//! - [`PaletteGenerator`]: palettes from images, image URLs, or at random

mod generator;
mod palettes;

pub use generator::{GeneratedPalette, PaletteGenerator, PaletteSource};
pub use palettes::{CreatePalette, ImportSummary, PaletteService};
