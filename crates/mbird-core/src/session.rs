//! Session wrapper around the current tree root

use std::sync::Arc;

use crate::error::Result;
use crate::model::TreeNode;
use crate::mutation::add_child;

/// Holds the root of the tree being edited.
///
/// The only writer is [`TreeModel::apply_add_child`]; a failed mutation
/// leaves the held root unchanged.
#[derive(Debug, Clone)]
pub struct TreeModel {
    root: Arc<TreeNode>,
}

impl TreeModel {
    pub fn new(root: impl Into<Arc<TreeNode>>) -> Self {
        TreeModel { root: root.into() }
    }

    pub fn current_tree(&self) -> Arc<TreeNode> {
        Arc::clone(&self.root)
    }

    /// Append a fresh leaf `new_child_id` under `parent_id` and return the new root.
    pub fn apply_add_child(&mut self, parent_id: &str, new_child_id: &str) -> Result<Arc<TreeNode>> {
        let updated = add_child(&self.root, parent_id, TreeNode::new(new_child_id))?;
        tracing::debug!("Added node {} under {}", new_child_id, parent_id);
        self.root = Arc::clone(&updated);
        Ok(updated)
    }
}
