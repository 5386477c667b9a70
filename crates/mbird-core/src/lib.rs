//! mbird core: project tree model, copy-on-write mutation, and descriptor storage

pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod mutation;
pub mod project;
pub mod session;


#[cfg(test)]
pub mod test_utils;

pub use api::{
    ErrorBody, HealthResponse, PathResponse, ProjectRequest, ProjectResponse, SaveResponse,
    SaveStatusResponse,
};
pub use config::{CONFIG_DIR_ENV, ConsoleConfig, LAST_DIRECTORY_FILE, home_dir};
pub use error::{CoreError, Result};
pub use model::{DirectoryEntry, DirectoryListing, GraphDocument, GraphEdge, GraphNode, Position, TreeNode};
pub use mutation::add_child;
pub use project::{
    PROJECT_EXT, TREE_FNAME, descriptor_path, load_project, parse_descriptor, project_dir,
    save_project, to_descriptor_json,
};
pub use session::TreeModel;
