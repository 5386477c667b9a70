//! Test utilities for the client crate

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mbird_core::{DirectoryEntry, DirectoryListing, TreeNode};
use tokio::sync::oneshot;

use crate::backend::{Backend, SaveReceipt};
use crate::disk::{DescriptorHandle, DirectoryAccess};
use crate::error::{ClientError, Result};

pub fn listing(current: &str, parent: Option<&str>, dirs: &[&str]) -> DirectoryListing {
    DirectoryListing {
        current: current.to_string(),
        parent: parent.map(str::to_string),
        directories: dirs
            .iter()
            .map(|name| DirectoryEntry {
                name: name.to_string(),
                path: format!("{}/{}", current.trim_end_matches('/'), name),
            })
            .collect(),
    }
}

/// In-memory backend with scriptable failures and gated responses.
#[derive(Default)]
pub struct MockBackend {
    pub default_path: Mutex<Option<String>>,
    pub listings: Mutex<HashMap<String, DirectoryListing>>,
    /// Browse calls for these paths wait until the sender fires.
    pub browse_gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    /// Create/load wait on this gate when set.
    pub submit_gate: Mutex<Option<oneshot::Receiver<()>>>,
    pub reject_submit: Mutex<Option<(u16, String)>>,
    pub fail_push: AtomicBool,
    pub pushed: Mutex<Vec<TreeNode>>,
    pub submitted: Mutex<Vec<(String, String)>>,
    pub saves: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listing(self, listing: DirectoryListing) -> Self {
        self.listings
            .lock()
            .unwrap()
            .insert(listing.current.clone(), listing);
        self
    }

    pub fn with_default(self, path: &str) -> Self {
        *self.default_path.lock().unwrap() = Some(path.to_string());
        self
    }

    pub fn gate_browse(&self, path: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.browse_gates.lock().unwrap().insert(path.to_string(), rx);
        tx
    }

    pub fn gate_submit(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.submit_gate.lock().unwrap() = Some(rx);
        tx
    }

    pub fn reject_with(&self, status: u16, message: &str) {
        *self.reject_submit.lock().unwrap() = Some((status, message.to_string()));
    }

    pub fn pushed(&self) -> Vec<TreeNode> {
        self.pushed.lock().unwrap().clone()
    }

    async fn submit(&self, verb: &str, path: &str) -> Result<Arc<TreeNode>> {
        let gate = self.submit_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.submitted
            .lock()
            .unwrap()
            .push((verb.to_string(), path.to_string()));
        if let Some((status, message)) = self.reject_submit.lock().unwrap().clone() {
            return Err(ClientError::BackendRejected { status, message });
        }
        Ok(Arc::new(TreeNode::new("root")))
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn create_project(&self, path: &str) -> Result<Arc<TreeNode>> {
        self.submit("create", path).await
    }

    async fn load_project(&self, path: &str) -> Result<Arc<TreeNode>> {
        self.submit("load", path).await
    }

    async fn push_tree(&self, tree: &TreeNode) -> Result<()> {
        if self.fail_push.load(Ordering::SeqCst) {
            return Err(ClientError::Transport("backend unreachable".into()));
        }
        self.pushed.lock().unwrap().push(tree.clone());
        Ok(())
    }

    async fn save(&self) -> Result<SaveReceipt> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(SaveReceipt {
            timestamp: "2026-01-01T00:00:00+00:00".to_string(),
        })
    }

    async fn save_status(&self) -> Result<Option<String>> {
        Ok(None)
    }

    async fn default_directory(&self) -> Result<String> {
        self.default_path
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ClientError::Transport("no default directory".into()))
    }

    async fn browse(&self, path: &str) -> Result<DirectoryListing> {
        let gate = self.browse_gates.lock().unwrap().remove(path);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.listings
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| ClientError::BackendRejected {
                status: 404,
                message: "Directory not found".to_string(),
            })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Descriptor that records writes in memory, or fails every write.
#[derive(Debug, Default)]
pub struct MemoryDescriptor {
    pub location: PathBuf,
    pub fail: bool,
    pub writes: Mutex<Vec<TreeNode>>,
}

impl MemoryDescriptor {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn writes(&self) -> Vec<TreeNode> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl DescriptorHandle for MemoryDescriptor {
    fn location(&self) -> &Path {
        &self.location
    }

    async fn read_tree(&self) -> Result<TreeNode> {
        self.writes
            .lock()
            .unwrap()
            .last()
            .cloned()
            .ok_or_else(|| ClientError::FilesystemNotFound("tree.json".into()))
    }

    async fn write_tree(&self, tree: &TreeNode) -> Result<()> {
        if self.fail {
            return Err(ClientError::Transport("disk unavailable".into()));
        }
        self.writes.lock().unwrap().push(tree.clone());
        Ok(())
    }
}

/// Access that hands out one shared [`MemoryDescriptor`].
pub struct MemoryAccess(pub Arc<MemoryDescriptor>);

#[async_trait]
impl DirectoryAccess for MemoryAccess {
    async fn acquire(&self, _path: &str) -> Result<Arc<dyn DescriptorHandle>> {
        let handle: Arc<dyn DescriptorHandle> = self.0.clone();
        Ok(handle)
    }
}

/// Access whose picker the user always dismisses.
pub struct CancellingAccess;

#[async_trait]
impl DirectoryAccess for CancellingAccess {
    async fn acquire(&self, _path: &str) -> Result<Arc<dyn DescriptorHandle>> {
        Err(ClientError::UserCancelled)
    }
}
