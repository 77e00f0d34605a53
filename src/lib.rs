//! Swatchbook - color palette extraction and palette library
//!
//! Library exports for testing and external use.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod services;
pub mod state;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use state::AppState;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the full application router with tracing and CORS layers.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(api::routes(state.clone()))
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}
