//! Router assembly for the replay HTTP API.
//!
//! [`build_router`] wires all handler functions to their routes with
//! CORS and tracing middleware layers.

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the complete axum router with all API routes.
///
/// Routes use axum 0.8 `/{param}` path syntax.
/// CORS is permissive (the visualizer is served from a different origin).
/// TraceLayer provides request-level logging via tracing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health::health_check))
        .route("/api/load", post(handlers::sessions::load))
        .route("/api/step/{id}", post(handlers::sessions::step))
        .route("/api/reset/{id}", post(handlers::sessions::reset))
        .route(
            "/api/continue/{id}",
            post(handlers::sessions::continue_execution),
        )
        .route("/api/state/{id}", get(handlers::sessions::current_state))
        .route("/api/history/{id}", get(handlers::sessions::history))
        .route(
            "/api/session/{id}",
            delete(handlers::sessions::delete_session),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
