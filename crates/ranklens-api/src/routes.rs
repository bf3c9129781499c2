//! API route definitions.

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::handlers::{health, seo};
use crate::middleware;
use crate::state::AppState;

/// Create the main API router with its middleware stack.
pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api/v1", api_routes())
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .layer(axum::middleware::from_fn(middleware::request_id))
        .layer(middleware::cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/websites/{website_id}/seo", seo_routes())
}

fn seo_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/overview", get(seo::overview))
        .route("/keywords", get(seo::keywords))
        .route("/competitors", get(seo::competitors))
        .route("/intersection", get(seo::intersection))
        .route("/history", get(seo::history))
        .route("/pages", get(seo::pages))
}
