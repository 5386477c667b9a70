//! REST API handlers for the mbird backend

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use axum_extra::extract::Query;
use chrono::Utc;
use mbird_core::{
    DirectoryListing, GraphDocument, GraphEdge, GraphNode, HealthResponse, PathResponse,
    ProjectRequest, ProjectResponse, SaveResponse, SaveStatusResponse, TreeNode, home_dir,
    load_project, save_project,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::filesystem::list_directories;
use crate::websocket::WsMessage;
use crate::{Project, ServerState};

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct BrowseParams {
    #[serde(default = "default_browse_path")]
    pub path: String,
}

fn default_browse_path() -> String {
    "/".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GraphResponse {
    pub status: String,
    pub graph: GraphDocument,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NodeResponse {
    pub status: String,
    pub node: GraphNode,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EdgeResponse {
    pub status: String,
    pub edge: GraphEdge,
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn required_path(request: ProjectRequest) -> Result<String, ApiError> {
    request
        .path
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing 'path' in request"))
}

/// Remember where the user was working.
fn record_last_directory(state: &ServerState, project_path: &Path) {
    let Some(parent) = project_path.parent() else {
        return;
    };
    if let Err(e) = state.console.save_last_directory(&parent.display().to_string()) {
        warn!("Cannot save last directory: {}", e);
    }
}

async fn replace_tree(state: &ServerState, root: Arc<TreeNode>, path: Option<PathBuf>) {
    let mut project = state.project.write().await;
    let path = match path {
        Some(path) => Some(path),
        None => project.as_ref().and_then(|p| p.path.clone()),
    };
    *project = Some(Project {
        root: Arc::clone(&root),
        path,
    });
    drop(project);

    match serde_json::to_string(&WsMessage::TreeUpdated { tree: root }) {
        Ok(msg) => {
            state.broadcast(msg);
        }
        Err(e) => warn!("Failed to serialize tree update: {}", e),
    }
}

/// Create a new project holding a single root node.
pub async fn create_project(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<ProjectRequest>,
) -> ApiResult<ProjectResponse> {
    let path = PathBuf::from(required_path(request)?);
    let root = Arc::new(TreeNode::new("root"));

    replace_tree(&state, Arc::clone(&root), Some(path.clone())).await;
    record_last_directory(&state, &path);

    info!("Created project at {}", path.display());
    Ok(Json(ProjectResponse::success(root)))
}

/// Load a project from its directory.
pub async fn load_project_handler(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<ProjectRequest>,
) -> ApiResult<ProjectResponse> {
    let path = PathBuf::from(required_path(request)?);

    let dir = path.clone();
    let tree = tokio::task::spawn_blocking(move || load_project(&dir))
        .await
        .map_err(|e| ApiError::internal(e.to_string()))??;
    let root = Arc::new(tree);

    replace_tree(&state, Arc::clone(&root), Some(path.clone())).await;
    record_last_directory(&state, &path);

    info!("Loaded project from {}", path.display());
    Ok(Json(ProjectResponse::success(root)))
}

/// Get the current tree.
pub async fn get_tree(State(state): State<Arc<ServerState>>) -> ApiResult<Arc<TreeNode>> {
    let project = state.project.read().await;
    project
        .as_ref()
        .map(|p| Json(Arc::clone(&p.root)))
        .ok_or_else(ApiError::no_project)
}

/// Replace the whole tree.
pub async fn update_tree(
    State(state): State<Arc<ServerState>>,
    Json(tree): Json<TreeNode>,
) -> ApiResult<ProjectResponse> {
    tree.validate()?;
    let root = Arc::new(tree);
    replace_tree(&state, Arc::clone(&root), None).await;
    Ok(Json(ProjectResponse::success(root)))
}

/// Write the current tree to the project directory.
pub async fn save_project_handler(State(state): State<Arc<ServerState>>) -> ApiResult<SaveResponse> {
    let mut project = state.project.write().await;
    let current = project.as_mut().ok_or_else(ApiError::no_project)?;
    let path = current
        .path
        .clone()
        .ok_or_else(|| ApiError::bad_request("No project path set"))?;

    let root = Arc::clone(&current.root);
    let written = tokio::task::spawn_blocking(move || save_project(&root, &path))
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?
        .map_err(|e| ApiError::internal(e.to_string()))?;
    current.path = Some(written.clone());
    drop(project);

    let now = Utc::now();
    *state.last_saved.write().await = Some(now);

    info!("Saved project to {}", written.display());
    Ok(Json(SaveResponse {
        status: "success".to_string(),
        timestamp: now.to_rfc3339(),
    }))
}

/// Timestamp of the last save.
pub async fn save_status(State(state): State<Arc<ServerState>>) -> Json<SaveStatusResponse> {
    let last_saved = state.last_saved.read().await;
    Json(SaveStatusResponse {
        last_saved: last_saved.as_ref().map(|t| t.to_rfc3339()),
    })
}

/// Where browsing starts: the last used directory, else home.
pub async fn default_directory(State(state): State<Arc<ServerState>>) -> Json<PathResponse> {
    Json(PathResponse {
        path: state.console.last_directory(),
    })
}

pub async fn home_directory() -> Json<PathResponse> {
    Json(PathResponse {
        path: home_dir().display().to_string(),
    })
}

/// List the directories under `?path=`.
pub async fn browse_directory(Query(params): Query<BrowseParams>) -> ApiResult<DirectoryListing> {
    let listing = tokio::task::spawn_blocking(move || list_directories(&params.path))
        .await
        .map_err(|e| ApiError::internal(e.to_string()))??;
    Ok(Json(listing))
}

// ── Graph document ──────────────────────────────────────

pub async fn get_graph(State(state): State<Arc<ServerState>>) -> Json<GraphDocument> {
    Json(state.graph.read().await.clone())
}

pub async fn update_graph(
    State(state): State<Arc<ServerState>>,
    Json(graph): Json<GraphDocument>,
) -> Json<GraphResponse> {
    *state.graph.write().await = graph.clone();
    Json(GraphResponse {
        status: "success".to_string(),
        graph,
    })
}

pub async fn add_graph_node(
    State(state): State<Arc<ServerState>>,
    Json(node): Json<GraphNode>,
) -> Json<NodeResponse> {
    state.graph.write().await.add_node(node.clone());
    Json(NodeResponse {
        status: "success".to_string(),
        node,
    })
}

pub async fn add_graph_edge(
    State(state): State<Arc<ServerState>>,
    Json(edge): Json<GraphEdge>,
) -> Json<EdgeResponse> {
    state.graph.write().await.add_edge(edge.clone());
    Json(EdgeResponse {
        status: "success".to_string(),
        edge,
    })
}
