//! Error types for tree and descriptor operations

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    /// The parent id named by a mutation is not in the tree.
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// An id appears more than once in the tree.
    #[error("Duplicate node id: {0}")]
    DuplicateId(String),

    /// An id reappears on its own ancestor chain.
    #[error("Cycle detected at node: {0}")]
    CycleDetected(String),

    #[error("Directory not found: {}", .0.display())]
    ProjectNotFound(PathBuf),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Project directory must have .mbird extension: {}", .0.display())]
    InvalidExtension(PathBuf),

    #[error("Tree file not found: {}", .0.display())]
    DescriptorNotFound(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
