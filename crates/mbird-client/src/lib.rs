//! Editing-session client for mbird
//!
//! This crate drives a project from acquisition to editing: it browses the
//! backend's filesystem to pick a location, creates or loads the project,
//! and mirrors every tree edit to the backend and, when available, to the
//! `tree.json` descriptor on disk.

pub mod acquisition;
pub mod backend;
pub mod disk;
pub mod error;
pub mod http;
pub mod navigation;
pub mod session;
pub mod sync;

#[cfg(test)]
pub mod test_utils;


pub use acquisition::{AcquisitionState, AcquisitionWorkflow, ProjectHandle};
pub use backend::{Backend, SaveReceipt};
pub use disk::{DescriptorHandle, DirectoryAccess, LocalAccess, LocalDescriptor, NoAccess};
pub use error::{ClientError, Result};
pub use http::{BACKEND_URL_ENV, DEFAULT_BACKEND_URL, HttpBackend};
pub use navigation::{NavigationState, NavigationTicket, Navigator, ProjectMode};
pub use session::{Edit, EditorSession};
pub use sync::{SyncPolicy, SyncReport};
