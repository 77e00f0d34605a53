//! Application state for Swatchbook.
//!
//! Contains the shared state that is passed to all handlers. Built once at
//! startup from an explicit [`Config`]; handlers never reach for globals.

use std::sync::Arc;
use std::time::Instant;

use swatchbook_extract::{ColormindClient, ImaggaClient};
use tracing::warn;

use crate::config::Config;
use crate::services::{PaletteGenerator, PaletteService};
use crate::storage::{self, PaletteStore};
use crate::Result;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Configuration the server was started with.
    pub config: Arc<Config>,
    /// Palette library over the selected storage backend.
    pub palettes: PaletteService,
    /// Palette generation (extraction and random).
    pub generator: PaletteGenerator,
    /// Server start time, for uptime reporting.
    pub started_at: Instant,
}

impl AppState {
    /// Create a new application state, initializing all services.
    pub async fn new(config: Config) -> Result<Self> {
        let store = storage::open_store(&config.storage).await?;

        if !config.imagga.has_credentials() {
            warn!("IMAGGA_API_KEY/IMAGGA_API_SECRET not set; image extraction will use fallback palettes");
        }

        let imagga = ImaggaClient::new(config.imagga.client_config(config.storage.platform))?;
        let colormind = ColormindClient::new(config.colormind.url.clone())?;

        Ok(Self::from_parts(
            config,
            store,
            PaletteGenerator::new(imagga, colormind),
        ))
    }

    /// Assemble state from already-constructed parts.
    pub fn from_parts(
        config: Config,
        store: Arc<dyn PaletteStore>,
        generator: PaletteGenerator,
    ) -> Self {
        let platform = config.storage.platform;
        Self {
            config: Arc::new(config),
            palettes: PaletteService::new(store, platform),
            generator,
            started_at: Instant::now(),
        }
    }
}
