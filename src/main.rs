//! Swatchbook - color palette extraction and palette library
//!
//! Extracts palettes from images through the Imagga API and keeps a local
//! library of named palettes in SQLite or a JSON blob store.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use swatchbook::{AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    // Initialize tracing (LOG_FORMAT=json for structured output)
    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "swatchbook=debug,swatchbook_extract=debug,tower_http=debug".into()),
    );
    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // Load configuration
    let config = Config::from_env();
    tracing::info!(
        platform = %config.storage.platform,
        "Starting Swatchbook server on {}:{}",
        config.server.host,
        config.server.port
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid HOST/PORT")?;

    // Initialize application state
    let state = AppState::new(config).await?;
    tracing::info!(backend = state.palettes.backend_name(), "Application state initialized");

    let app = swatchbook::app(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
