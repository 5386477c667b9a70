//! Wire types shared by the backend service and its clients

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::model::TreeNode;

/// Body of `POST /api/project/create` and `POST /api/project/load`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProjectRequest {
    #[serde(default)]
    pub path: Option<String>,
}

impl ProjectRequest {
    pub fn new(path: impl Into<String>) -> Self {
        ProjectRequest {
            path: Some(path.into()),
        }
    }
}

/// Successful project or tree response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectResponse {
    pub status: String,
    pub tree: Arc<TreeNode>,
}

impl ProjectResponse {
    pub fn success(tree: Arc<TreeNode>) -> Self {
        ProjectResponse {
            status: "success".to_string(),
            tree,
        }
    }
}

/// Response of `POST /api/save`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub status: String,
    /// RFC 3339, UTC.
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveStatusResponse {
    pub last_saved: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathResponse {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}
