//! HTTP routes for the schema browser.

mod api;

use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::path::PathBuf;
use tower_http::{cors::CorsLayer, services::ServeDir};

/// Create the main router with all routes.
///
/// Static files come from `static_dir`, then `SCHEMALENS_STATIC_DIR`, then
/// the crate's bundled `static/` directory.
pub fn create_router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let static_dir = static_dir
        .or_else(|| std::env::var("SCHEMALENS_STATIC_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static"));

    Router::new()
        .route("/api/health", get(api::health))
        .route("/api/concepts", get(api::list_concepts))
        .route("/api/concepts/:label", get(api::get_concept))
        .route("/api/rebuild", post(api::rebuild))
        .fallback_service(ServeDir::new(static_dir).append_index_html_on_directories(true))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
