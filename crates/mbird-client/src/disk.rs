//! Optional writable handle on the project's `tree.json`

use std::fmt::Debug;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use mbird_core::{CoreError, TREE_FNAME, TreeNode, descriptor_path, parse_descriptor, project_dir, to_descriptor_json};
use tracing::{debug, info};

use crate::error::{ClientError, Result};

/// A bound descriptor file the session may overwrite.
#[async_trait]
pub trait DescriptorHandle: Debug + Send + Sync {
    /// Directory holding the descriptor.
    fn location(&self) -> &Path;

    async fn read_tree(&self) -> Result<TreeNode>;

    /// Overwrite the descriptor with `tree`, pretty-printed.
    async fn write_tree(&self, tree: &TreeNode) -> Result<()>;
}

/// Platform capability to obtain a [`DescriptorHandle`] for a chosen path.
#[async_trait]
pub trait DirectoryAccess: Send + Sync {
    /// Fails with [`ClientError::FilesystemUnsupported`] when the platform
    /// has no such capability and [`ClientError::UserCancelled`] when an
    /// interactive picker is dismissed.
    async fn acquire(&self, path: &str) -> Result<Arc<dyn DescriptorHandle>>;
}

/// Descriptor stored in a local project directory.
#[derive(Debug, Clone)]
pub struct LocalDescriptor {
    dir: PathBuf,
}

impl LocalDescriptor {
    /// `path` gets the project extension appended when missing.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            dir: project_dir(path.as_ref()),
        }
    }
}

#[async_trait]
impl DescriptorHandle for LocalDescriptor {
    fn location(&self) -> &Path {
        &self.dir
    }

    async fn read_tree(&self) -> Result<TreeNode> {
        let path = descriptor_path(&self.dir);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ClientError::FilesystemNotFound(TREE_FNAME.to_string()));
            }
            Err(e) => return Err(CoreError::from(e).into()),
        };
        Ok(parse_descriptor(&contents)?)
    }

    async fn write_tree(&self, tree: &TreeNode) -> Result<()> {
        let json = to_descriptor_json(tree)?;
        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || replace_descriptor(&dir, &json))
            .await
            .map_err(|e| CoreError::from(std::io::Error::other(e)))?
            .map_err(CoreError::from)?;
        debug!("Wrote {}", descriptor_path(&self.dir).display());
        Ok(())
    }
}

/// Write to a temporary file in `dir`, then rename it over `tree.json`.
/// Readers see either the old descriptor or the new one, never a mix.
fn replace_descriptor(dir: &Path, json: &str) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(json.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(descriptor_path(dir)).map_err(|e| e.error)?;
    Ok(())
}

/// Direct access to the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalAccess;

#[async_trait]
impl DirectoryAccess for LocalAccess {
    async fn acquire(&self, path: &str) -> Result<Arc<dyn DescriptorHandle>> {
        let descriptor = LocalDescriptor::new(path);
        info!("Bound descriptor at {}", descriptor.location().display());
        Ok(Arc::new(descriptor))
    }
}

/// No filesystem capability: sessions persist through the backend only.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAccess;

#[async_trait]
impl DirectoryAccess for NoAccess {
    async fn acquire(&self, _path: &str) -> Result<Arc<dyn DescriptorHandle>> {
        Err(ClientError::FilesystemUnsupported)
    }
}
