//! Axum router setup for the coursemap server

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::{
    handlers::{delete_module, get_graph, get_modules, health_check, post_edge, put_module},
    ws::ws_handler,
    ServerState,
};

/// Create the axum router with all routes
pub fn create_router(state: Arc<ServerState>) -> Router {
    Router::new()
        // WebSocket endpoint for committed-diff updates
        .route("/ws/:course_code", get(ws_handler))
        // REST API endpoints
        .route("/courseModule/course/:course_code/modules", get(get_modules))
        .route("/courseModule/course/:course_code/graph", get(get_graph))
        .route(
            "/courseModule/course/:course_code/module/edit/:id",
            put(put_module),
        )
        .route(
            "/courseModule/course/:course_code/module/:id",
            axum::routing::delete(delete_module),
        )
        .route("/courseModule/course/:course_code/edge", post(post_edge))
        .route("/api/health", get(health_check))
        // Add CORS support
        .layer(CorsLayer::permissive())
        // Add state
        .with_state(state)
}
