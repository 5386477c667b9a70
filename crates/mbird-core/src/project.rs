//! On-disk project descriptor: `<name>.mbird/tree.json`

use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};
use crate::model::TreeNode;

/// Descriptor file inside a project directory
pub const TREE_FNAME: &str = "tree.json";

/// Extension every project directory carries
pub const PROJECT_EXT: &str = "mbird";

/// Append the `.mbird` extension unless the path already has it.
pub fn project_dir(path: &Path) -> PathBuf {
    if has_project_ext(path) {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(".");
        name.push(PROJECT_EXT);
        PathBuf::from(name)
    }
}

/// Get descriptor file path
pub fn descriptor_path(dir: &Path) -> PathBuf {
    dir.join(TREE_FNAME)
}

fn has_project_ext(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == PROJECT_EXT)
}

/// Serialize a tree the way it is stored: pretty JSON, 2-space indent.
pub fn to_descriptor_json(tree: &TreeNode) -> Result<String> {
    Ok(serde_json::to_string_pretty(tree)?)
}

/// Parse and validate descriptor contents.
pub fn parse_descriptor(contents: &str) -> Result<TreeNode> {
    let tree: TreeNode = serde_json::from_str(contents)?;
    tree.validate()?;
    Ok(tree)
}

/// Load the tree of an existing project directory.
pub fn load_project(dir: &Path) -> Result<TreeNode> {
    if !has_project_ext(dir) {
        return Err(CoreError::InvalidExtension(dir.to_path_buf()));
    }
    if !dir.exists() {
        return Err(CoreError::ProjectNotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(CoreError::NotADirectory(dir.to_path_buf()));
    }

    let path = descriptor_path(dir);
    if !path.exists() {
        return Err(CoreError::DescriptorNotFound(path));
    }

    let tree = parse_descriptor(&std::fs::read_to_string(&path)?)?;
    tracing::debug!("Loaded project descriptor: {}", path.display());
    Ok(tree)
}

/// Write the tree under `dir` (extension appended when missing), creating
/// parent directories. Returns the directory actually written.
pub fn save_project(tree: &TreeNode, dir: &Path) -> Result<PathBuf> {
    let dir = project_dir(dir);
    std::fs::create_dir_all(&dir)?;

    let path = descriptor_path(&dir);
    std::fs::write(&path, to_descriptor_json(tree)?)?;

    tracing::debug!("Saved project descriptor: {}", path.display());
    Ok(dir)
}
