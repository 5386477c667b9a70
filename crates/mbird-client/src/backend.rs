//! The backend collaborator seen from an editing session

use std::sync::Arc;

use async_trait::async_trait;
use mbird_core::{DirectoryListing, TreeNode};

use crate::error::Result;

/// Server-stamped checkpoint returned by an explicit save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReceipt {
    pub timestamp: String,
}

/// Backend operations an editing session depends on.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Create a project at `path` and return its initial tree.
    async fn create_project(&self, path: &str) -> Result<Arc<TreeNode>>;

    /// Load the descriptor of an existing project.
    async fn load_project(&self, path: &str) -> Result<Arc<TreeNode>>;

    /// Mirror the whole tree.
    async fn push_tree(&self, tree: &TreeNode) -> Result<()>;

    /// Commit a checkpoint. Idempotent.
    async fn save(&self) -> Result<SaveReceipt>;

    /// Timestamp of the last checkpoint, if any.
    async fn save_status(&self) -> Result<Option<String>>;

    /// Where directory browsing starts.
    async fn default_directory(&self) -> Result<String>;

    /// List the subdirectories of `path`.
    async fn browse(&self, path: &str) -> Result<DirectoryListing>;

    fn name(&self) -> &str;
}
