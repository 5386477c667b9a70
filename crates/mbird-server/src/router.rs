//! Axum router setup for the mbird backend

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use crate::{
    ServerState,
    handlers::{
        add_graph_edge, add_graph_node, browse_directory, create_project, default_directory,
        get_graph, get_tree, health_check, home_directory, load_project_handler,
        save_project_handler, save_status, update_graph, update_tree,
    },
    websocket::ws_handler,
};

/// Create the axum router with all routes
pub fn create_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/api/health", get(health_check))
        // Project lifecycle
        .route("/api/project/create", post(create_project))
        .route("/api/project/load", post(load_project_handler))
        .route("/api/tree", get(get_tree).post(update_tree))
        .route("/api/save", post(save_project_handler))
        .route("/api/save/status", get(save_status))
        // Location browser
        .route("/api/filesystem/default", get(default_directory))
        .route("/api/filesystem/home", get(home_directory))
        .route("/api/filesystem/browse", get(browse_directory))
        // Graph document
        .route("/api/graph", get(get_graph).post(update_graph))
        .route("/api/graph/node", post(add_graph_node))
        .route("/api/graph/edge", post(add_graph_edge))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
