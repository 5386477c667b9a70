//! Copy-on-write tree mutation

use std::sync::Arc;

use crate::error::{CoreError, Result};
use crate::model::TreeNode;

/// Append `new_child` as the last child of the node `parent_id`.
///
/// The input tree is never touched. The result is a new root in which only
/// the nodes on the path from the root to `parent_id` are rebuilt; every
/// other subtree is the same `Arc` as in `root`, so `Arc::ptr_eq` tells which
/// subtrees changed.
///
/// Fails with [`CoreError::DuplicateId`] if `new_child` (or any node below
/// it) reuses an id already in `root`, and with [`CoreError::NodeNotFound`]
/// if `parent_id` is absent. Ids are supplied by the caller; this function
/// never generates one.
pub fn add_child(root: &Arc<TreeNode>, parent_id: &str, new_child: TreeNode) -> Result<Arc<TreeNode>> {
    new_child.validate()?;
    if let Some(id) = new_child.ids().into_iter().find(|id| root.contains(id)) {
        return Err(CoreError::DuplicateId(id.to_string()));
    }

    let new_child = Arc::new(new_child);
    insert(root, parent_id, &new_child).ok_or_else(|| CoreError::NodeNotFound(parent_id.to_string()))
}

/// Returns `None` when `parent_id` is not in this subtree, leaving it shared.
fn insert(node: &Arc<TreeNode>, parent_id: &str, new_child: &Arc<TreeNode>) -> Option<Arc<TreeNode>> {
    if node.id == parent_id {
        let mut children = node.children.clone();
        children.push(Arc::clone(new_child));
        return Some(Arc::new(TreeNode {
            id: node.id.clone(),
            children,
            is_stale: node.is_stale,
        }));
    }

    // Ids are unique, so at most one child can contain the target.
    let (index, replaced) = node
        .children
        .iter()
        .enumerate()
        .find_map(|(i, child)| insert(child, parent_id, new_child).map(|c| (i, c)))?;

    let mut children = node.children.clone();
    children[index] = replaced;
    Some(Arc::new(TreeNode {
        id: node.id.clone(),
        children,
        is_stale: node.is_stale,
    }))
}
