//! Test utilities for mbird

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use crate::model::TreeNode;
use crate::project::save_project;

/// root
/// ├── design
/// │   ├── sketch
/// │   └── review
/// └── build
pub fn sample_tree() -> Arc<TreeNode> {
    Arc::new(TreeNode::with_children(
        "root",
        vec![
            TreeNode::with_children(
                "design",
                vec![TreeNode::new("sketch"), TreeNode::new("review")],
            ),
            TreeNode::new("build"),
        ],
    ))
}

/// Write `tree` into a fresh `sample.mbird` project under a temp dir.
pub fn create_test_project(tree: &TreeNode) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let dir = save_project(tree, &temp_dir.path().join("sample")).unwrap();
    (temp_dir, dir)
}
