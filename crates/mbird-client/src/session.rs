//! Editing session over an acquired project

use std::sync::{Arc, Mutex, MutexGuard};

use mbird_core::{TreeModel, TreeNode};
use tokio::task::JoinHandle;
use tracing::info;

use crate::acquisition::ProjectHandle;
use crate::backend::{Backend, SaveReceipt};
use crate::error::Result;
use crate::sync::{SyncPolicy, SyncReport};

/// Result of one local edit.
#[derive(Debug)]
pub struct Edit {
    pub child_id: String,
    /// The new root, already held by the session.
    pub tree: Arc<TreeNode>,
    /// Background sync of `tree`; dropping it does not cancel the sync.
    pub sync: JoinHandle<SyncReport>,
}

pub struct EditorSession {
    path: String,
    model: Mutex<TreeModel>,
    sync: SyncPolicy,
    backend: Arc<dyn Backend>,
}

impl EditorSession {
    pub fn new(handle: ProjectHandle, backend: Arc<dyn Backend>) -> Self {
        let sync = SyncPolicy::new(Arc::clone(&backend), handle.descriptor);
        Self {
            path: handle.path,
            model: Mutex::new(TreeModel::new(handle.tree)),
            sync,
            backend,
        }
    }

    fn model(&self) -> MutexGuard<'_, TreeModel> {
        self.model.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn has_descriptor(&self) -> bool {
        self.sync.has_descriptor()
    }

    pub fn current_tree(&self) -> Arc<TreeNode> {
        self.model().current_tree()
    }

    /// Add a child with a time-derived id under `parent_id`.
    pub fn add_child(&self, parent_id: &str) -> Result<Edit> {
        let mut model = self.model();
        let child_id = next_node_id(&model.current_tree(), chrono::Utc::now().timestamp_millis());
        self.apply(&mut model, parent_id, &child_id)
    }

    /// Apply the edit locally and dispatch its sync without waiting for it.
    /// Must be called within a tokio runtime.
    pub fn add_child_with_id(&self, parent_id: &str, child_id: &str) -> Result<Edit> {
        let mut model = self.model();
        self.apply(&mut model, parent_id, child_id)
    }

    /// Edits are dispatched while the model is held, so dispatch order
    /// matches edit order.
    fn apply(&self, model: &mut TreeModel, parent_id: &str, child_id: &str) -> Result<Edit> {
        let tree = model.apply_add_child(parent_id, child_id)?;
        let sync = self.sync.dispatch(Arc::clone(&tree));
        Ok(Edit {
            child_id: child_id.to_string(),
            tree,
            sync,
        })
    }

    /// Explicit checkpoint. Leaves the in-memory tree alone.
    pub async fn save(&self) -> Result<SaveReceipt> {
        let receipt = self.backend.save().await?;
        info!("Saved {} at {}", self.path, receipt.timestamp);
        Ok(receipt)
    }

    pub async fn last_saved(&self) -> Result<Option<String>> {
        self.backend.save_status().await
    }
}

/// `node_<millis>`, bumped until it is unused in `tree`.
pub fn next_node_id(tree: &TreeNode, millis: i64) -> String {
    let mut stamp = millis;
    loop {
        let id = format!("node_{}", stamp);
        if !tree.contains(&id) {
            return id;
        }
        stamp += 1;
    }
}
