//! HTTP API for Swatchbook.
//!
//! JSON over HTTP; palettes use camelCase field names throughout.

mod generate;
mod palettes;
pub mod status;

use axum::Router;

use crate::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(status::routes())
        .nest("/palettes", palettes::routes())
        .nest("/generate", generate::routes(state))
}
