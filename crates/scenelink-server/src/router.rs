//! Router assembly for the scenelink HTTP API.
//!
//! [`build_router`] wires all handler functions to their routes with
//! CORS and tracing middleware layers.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the complete axum router with all API routes.
///
/// Routes use axum 0.8 `/{param}` path syntax.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Undo / redo
        .route("/undo", post(handlers::history::undo))
        .route("/redo", post(handlers::history::redo))
        // Checkpoints
        .route(
            "/checkpoints",
            get(handlers::history::list_checkpoints).post(handlers::history::create_checkpoint),
        )
        .route(
            "/checkpoints/{name}/restore",
            post(handlers::history::restore_checkpoint),
        )
        .route("/history", get(handlers::history::list_history))
        // Command execution
        .route("/batch", post(handlers::batch::run_batch))
        .route("/tools/{tool}", post(handlers::tools::run_tool))
        // Host connection
        .route("/bridge/status", get(handlers::bridge::bridge_status))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
