//! Project acquisition: choose a mode, pick a path, create or load
//!
//! ```text
//! ModeSelection ─choose_mode─▶ Navigating ─submit─▶ Submitting ─┬─▶ Loaded
//!       ▲                          ▲                            └─▶ Failed
//!       └────────── back ──────────┴──── reselect / submit ◀────────┘
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use mbird_core::TreeNode;
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::disk::{DescriptorHandle, DirectoryAccess};
use crate::error::{ClientError, Result};
use crate::navigation::{Navigator, ProjectMode};
use crate::session::EditorSession;

/// The chosen project location and the tree obtained for it.
#[derive(Clone)]
pub struct ProjectHandle {
    pub path: String,
    pub tree: Arc<TreeNode>,
    /// Writable descriptor, when the platform provides one.
    pub descriptor: Option<Arc<dyn DescriptorHandle>>,
}

impl fmt::Debug for ProjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectHandle")
            .field("path", &self.path)
            .field("root", &self.tree.id)
            .field("descriptor", &self.descriptor.as_ref().map(|d| d.location().to_path_buf()))
            .finish()
    }
}

impl ProjectHandle {
    /// Start editing this project.
    pub fn into_session(self, backend: Arc<dyn Backend>) -> EditorSession {
        EditorSession::new(self, backend)
    }
}

#[derive(Debug, Clone)]
pub enum AcquisitionState {
    ModeSelection,
    Navigating { mode: ProjectMode },
    Submitting { mode: ProjectMode, path: String },
    Loaded(ProjectHandle),
    Failed { mode: ProjectMode, message: String },
}

impl AcquisitionState {
    pub fn mode(&self) -> Option<ProjectMode> {
        match self {
            AcquisitionState::ModeSelection | AcquisitionState::Loaded(_) => None,
            AcquisitionState::Navigating { mode }
            | AcquisitionState::Submitting { mode, .. }
            | AcquisitionState::Failed { mode, .. } => Some(*mode),
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, AcquisitionState::Submitting { .. })
    }
}

struct Inner {
    state: AcquisitionState,
    navigator: Option<Arc<Navigator>>,
}

pub struct AcquisitionWorkflow {
    backend: Arc<dyn Backend>,
    access: Arc<dyn DirectoryAccess>,
    inner: Mutex<Inner>,
}

impl AcquisitionWorkflow {
    pub fn new(backend: Arc<dyn Backend>, access: Arc<dyn DirectoryAccess>) -> Self {
        Self {
            backend,
            access,
            inner: Mutex::new(Inner {
                state: AcquisitionState::ModeSelection,
                navigator: None,
            }),
        }
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> AcquisitionState {
        self.inner().state.clone()
    }

    pub fn navigator(&self) -> Option<Arc<Navigator>> {
        self.inner().navigator.clone()
    }

    /// Leave `ModeSelection` for `Navigating`. No network calls are made;
    /// call [`Navigator::start`] on the returned navigator.
    pub fn choose_mode(&self, mode: ProjectMode) -> Result<Arc<Navigator>> {
        let mut inner = self.inner();
        if !matches!(inner.state, AcquisitionState::ModeSelection) {
            return Err(ClientError::InvalidState(format!(
                "cannot choose a mode while {:?}",
                inner.state
            )));
        }
        let navigator = Arc::new(Navigator::new(Arc::clone(&self.backend), mode));
        inner.navigator = Some(Arc::clone(&navigator));
        inner.state = AcquisitionState::Navigating { mode };
        debug!("Acquisition mode: {}", mode.verb());
        Ok(navigator)
    }

    /// Return to `ModeSelection` from any state but `Submitting`. In-flight
    /// listings of the dropped navigator are abandoned.
    pub fn back(&self) -> Result<()> {
        let mut inner = self.inner();
        if inner.state.is_submitting() {
            return Err(ClientError::InvalidState("submission in flight".to_string()));
        }
        if let Some(navigator) = inner.navigator.take() {
            navigator.abandon();
        }
        inner.state = AcquisitionState::ModeSelection;
        Ok(())
    }

    /// From `Failed`, resume browsing with the same mode.
    pub fn reselect(&self) -> Result<()> {
        let mut inner = self.inner();
        let AcquisitionState::Failed { mode, .. } = inner.state else {
            return Err(ClientError::InvalidState(format!(
                "cannot reselect while {:?}",
                inner.state
            )));
        };
        inner.state = AcquisitionState::Navigating { mode };
        Ok(())
    }

    /// Submit the navigator's current selection. In create mode a non-empty
    /// name is required.
    pub async fn submit_selection(&self, create_name: Option<&str>) -> Result<AcquisitionState> {
        let navigator = self
            .navigator()
            .ok_or_else(|| ClientError::InvalidState("no mode chosen".to_string()))?;
        if !navigator.can_select(create_name) {
            return Err(ClientError::InvalidState("nothing to select".to_string()));
        }
        let path = navigator
            .select_current(create_name)
            .ok_or_else(|| ClientError::InvalidState("no listing shown".to_string()))?;
        self.submit(&path).await
    }

    /// Create or load the project at `path`, depending on the chosen mode.
    ///
    /// Allowed from `Navigating` and, as a retry, from `Failed`. A second
    /// call while one is in flight fails with [`ClientError::InvalidState`].
    /// Backend failures are not errors here: they land in `Failed` and the
    /// new state is returned. In load mode a bound descriptor must hold a
    /// readable `tree.json`, otherwise the attempt fails before the backend
    /// is asked. If the user dismisses the directory picker the state reverts
    /// silently.
    pub async fn submit(&self, path: &str) -> Result<AcquisitionState> {
        let (mode, previous) = {
            let mut inner = self.inner();
            let mode = match &inner.state {
                AcquisitionState::Navigating { mode } | AcquisitionState::Failed { mode, .. } => *mode,
                other => {
                    return Err(ClientError::InvalidState(format!("cannot submit while {:?}", other)));
                }
            };
            let previous = std::mem::replace(
                &mut inner.state,
                AcquisitionState::Submitting {
                    mode,
                    path: path.to_string(),
                },
            );
            (mode, previous)
        };

        let descriptor = match self.access.acquire(path).await {
            Ok(descriptor) => Some(descriptor),
            Err(ClientError::UserCancelled) => {
                debug!("Directory picker dismissed");
                self.inner().state = previous.clone();
                return Ok(previous);
            }
            Err(ClientError::FilesystemUnsupported) => {
                info!("No filesystem access, persisting through the backend only");
                None
            }
            Err(e) => {
                warn!("Cannot bind descriptor for {}: {}", path, e);
                None
            }
        };

        let result = match mode {
            ProjectMode::Create => self.backend.create_project(path).await,
            ProjectMode::Load => match &descriptor {
                // The chosen directory must actually hold a descriptor.
                Some(descriptor) => match descriptor.read_tree().await {
                    Ok(_) => self.backend.load_project(path).await,
                    Err(e) => Err(e),
                },
                None => self.backend.load_project(path).await,
            },
        };

        let next = match result {
            Ok(tree) => {
                if mode == ProjectMode::Create {
                    if let Some(descriptor) = &descriptor {
                        if let Err(e) = descriptor.write_tree(&tree).await {
                            warn!("Failed to write initial tree.json: {}", e);
                        }
                    }
                }
                info!("Project {}d at {}", mode.verb(), path);
                AcquisitionState::Loaded(ProjectHandle {
                    path: path.to_string(),
                    tree,
                    descriptor,
                })
            }
            Err(e) => {
                let message = format!("Failed to {} project: {}", mode.verb(), e);
                warn!("{}", message);
                AcquisitionState::Failed { mode, message }
            }
        };

        self.inner().state = next.clone();
        Ok(next)
    }

    /// The handle once `Loaded`.
    pub fn project(&self) -> Option<ProjectHandle> {
        match &self.inner().state {
            AcquisitionState::Loaded(handle) => Some(handle.clone()),
            _ => None,
        }
    }
}
