//! Axum router: maps URL paths to handlers.

use axum::{
    Router,
    routing::{get, put},
};
use tower_http::{
    cors::CorsLayer,
    trace::TraceLayer,
};
use std::sync::Arc;
use crate::state::{AppState, SharedState, UNAVAILABLE_PATH};
use crate::handlers::{
    experiment::{get_view, put_selection, put_weights},
    system::{health, index, projects, unavailable},
};
use crate::sse::sse_handler;

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        // Pages
        .route("/",              get(index))
        .route(UNAVAILABLE_PATH, get(unavailable))

        // SSE streaming
        .route("/api/events",    get(sse_handler))

        // API endpoints
        .route("/api/health",    get(health))
        .route("/api/projects",  get(projects))
        .route("/api/selection", put(put_selection))
        .route("/api/weights",   put(put_weights))
        .route("/api/view",      get(get_view))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
