//! Per-edit synchronization of the tree to its mirrors
//!
//! After every edit the whole tree goes to the backend and, when a
//! descriptor is bound, to `tree.json`. The two writes are independent:
//! either may fail while the other succeeds, failures are only logged, and
//! the local tree stays authoritative.
//!
//! Backend pushes may complete in any order. Disk writes are taken one at a
//! time and a tree older than the one already on disk is skipped, so the
//! descriptor ends up holding the latest dispatched tree.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use mbird_core::TreeNode;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::backend::Backend;
use crate::disk::DescriptorHandle;
use crate::error::Result;

/// Outcome of one sync, kept for logging and tests.
#[derive(Debug)]
pub struct SyncReport {
    pub backend: Result<()>,
    /// `None` when no descriptor is bound.
    pub disk: Option<Result<()>>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.backend.is_ok() && self.disk.as_ref().is_none_or(|r| r.is_ok())
    }
}

#[derive(Clone)]
pub struct SyncPolicy {
    backend: Arc<dyn Backend>,
    descriptor: Option<Arc<dyn DescriptorHandle>>,
    /// Next sequence number handed to a sync.
    issued: Arc<AtomicU64>,
    /// Sequence number of the tree currently on disk. Held while writing.
    on_disk: Arc<Mutex<u64>>,
}

impl SyncPolicy {
    pub fn new(backend: Arc<dyn Backend>, descriptor: Option<Arc<dyn DescriptorHandle>>) -> Self {
        Self {
            backend,
            descriptor,
            issued: Arc::new(AtomicU64::new(1)),
            on_disk: Arc::new(Mutex::new(0)),
        }
    }

    fn next_seq(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst)
    }

    pub fn has_descriptor(&self) -> bool {
        self.descriptor.is_some()
    }

    /// Push to the backend, then overwrite the descriptor. Never fails.
    pub async fn sync(&self, tree: &TreeNode) -> SyncReport {
        let seq = self.next_seq();
        self.sync_in_order(seq, tree).await
    }

    async fn sync_in_order(&self, seq: u64, tree: &TreeNode) -> SyncReport {
        let backend = self.backend.push_tree(tree).await;
        match &backend {
            Ok(()) => debug!("Mirrored tree to {} backend", self.backend.name()),
            Err(e) => error!("Failed to update tree: {}", e),
        }

        let disk = match &self.descriptor {
            Some(descriptor) => Some(self.write_descriptor(descriptor.as_ref(), seq, tree).await),
            None => None,
        };

        SyncReport { backend, disk }
    }

    async fn write_descriptor(
        &self,
        descriptor: &dyn DescriptorHandle,
        seq: u64,
        tree: &TreeNode,
    ) -> Result<()> {
        let mut on_disk = self.on_disk.lock().await;
        if *on_disk > seq {
            debug!("Skipping tree.json write {}, {} already on disk", seq, *on_disk);
            return Ok(());
        }
        let result = descriptor.write_tree(tree).await;
        match &result {
            Ok(()) => *on_disk = seq,
            Err(e) => warn!(
                "Failed to save tree.json in {}: {}",
                descriptor.location().display(),
                e
            ),
        }
        result
    }

    /// Run [`SyncPolicy::sync`] on a background task. Callers do not have
    /// to await the handle; later edits may be dispatched before earlier
    /// syncs finish. Dispatch order decides which tree the descriptor keeps.
    pub fn dispatch(&self, tree: Arc<TreeNode>) -> JoinHandle<SyncReport> {
        let seq = self.next_seq();
        let policy = self.clone();
        tokio::spawn(async move { policy.sync_in_order(seq, &tree).await })
    }
}
