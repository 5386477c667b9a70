//! Integration tests for mbird
//!
//! A real backend on an ephemeral port, driven through the HTTP client.

use std::path::Path;
use std::sync::Arc;

use mbird_client::{
    AcquisitionState, AcquisitionWorkflow, Backend, HttpBackend, LocalAccess, NoAccess,
    ProjectMode,
};
use mbird_core::{ConsoleConfig, TREE_FNAME, load_project};
use mbird_server::{MbirdServer, ServerConfig, ServerState};
use tempfile::TempDir;
use tokio::net::TcpListener;

struct TestBackend {
    http: Arc<HttpBackend>,
    state: Arc<ServerState>,
    _config_dir: TempDir,
}

async fn spawn_backend() -> TestBackend {
    let config_dir = TempDir::new().unwrap();
    let server = MbirdServer::new(
        ConsoleConfig::new(config_dir.path()),
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
    );
    let state = server.state();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        server.serve(listener).await.unwrap();
    });

    TestBackend {
        http: Arc::new(HttpBackend::new(format!("http://{}", addr))),
        state,
        _config_dir: config_dir,
    }
}

fn canonical(path: &Path) -> String {
    path.canonicalize().unwrap().display().to_string()
}

#[tokio::test]
async fn test_create_edit_save_and_reload() {
    let backend = spawn_backend().await;
    let workspace = TempDir::new().unwrap();

    // Create through the location browser.
    let workflow = AcquisitionWorkflow::new(backend.http.clone(), Arc::new(LocalAccess));
    let navigator = workflow.choose_mode(ProjectMode::Create).unwrap();
    assert!(navigator.navigate(&canonical(workspace.path())).await);
    let state = workflow.submit_selection(Some("proj")).await.unwrap();
    let AcquisitionState::Loaded(handle) = state else {
        panic!("expected Loaded, got {:?}", state);
    };
    assert_eq!(handle.path, format!("{}/proj", canonical(workspace.path())));
    assert_eq!(handle.tree.id, "root");

    // The initial descriptor was written next to where the backend saves.
    let project_dir = workspace.path().join("proj.mbird");
    assert!(project_dir.join(TREE_FNAME).exists());

    let session = handle.into_session(backend.http.clone());
    assert!(session.has_descriptor());

    let edit = session.add_child_with_id("root", "design").unwrap();
    assert!(edit.sync.await.unwrap().is_clean());
    let edit = session.add_child_with_id("design", "sketch").unwrap();
    assert!(edit.sync.await.unwrap().is_clean());

    // Both mirrors saw the edit.
    let on_disk = load_project(&project_dir).unwrap();
    assert!(on_disk.contains("sketch"));
    {
        let project = backend.state.project.read().await;
        assert!(project.as_ref().unwrap().root.contains("sketch"));
    }

    assert_eq!(session.last_saved().await.unwrap(), None);
    let receipt = session.save().await.unwrap();
    assert_eq!(session.last_saved().await.unwrap(), Some(receipt.timestamp));

    // Load it back, starting from the remembered directory.
    let workflow = AcquisitionWorkflow::new(backend.http.clone(), Arc::new(LocalAccess));
    let navigator = workflow.choose_mode(ProjectMode::Load).unwrap();
    assert!(navigator.start().await);
    let listing = navigator.listing().unwrap();
    assert_eq!(listing.current, canonical(workspace.path()));
    let entry = listing
        .directories
        .iter()
        .find(|d| d.name == "proj.mbird")
        .unwrap();
    assert!(navigator.navigate(&entry.path).await);

    let state = workflow.submit_selection(None).await.unwrap();
    let AcquisitionState::Loaded(handle) = state else {
        panic!("expected Loaded, got {:?}", state);
    };
    assert_eq!(handle.tree.ids(), vec!["root", "design", "sketch"]);
}

#[tokio::test]
async fn test_load_failure_then_retry() {
    let backend = spawn_backend().await;
    let workspace = TempDir::new().unwrap();
    let missing = workspace.path().join("missing.mbird");

    let workflow = AcquisitionWorkflow::new(backend.http.clone(), Arc::new(NoAccess));
    workflow.choose_mode(ProjectMode::Load).unwrap();

    let state = workflow.submit(&missing.display().to_string()).await.unwrap();
    let AcquisitionState::Failed { message, .. } = state else {
        panic!("expected Failed, got {:?}", state);
    };
    assert!(message.starts_with("Failed to load project: 400 Directory not found"));

    // A retry from Failed succeeds once the project exists.
    let tree = mbird_core::TreeNode::new("root");
    mbird_core::save_project(&tree, &missing).unwrap();
    let state = workflow.submit(&missing.display().to_string()).await.unwrap();
    let AcquisitionState::Loaded(handle) = state else {
        panic!("expected Loaded, got {:?}", state);
    };
    assert!(handle.descriptor.is_none());
}

#[tokio::test]
async fn test_browse_errors_are_reported() {
    let backend = spawn_backend().await;

    let err = backend.http.browse("/definitely/not/here").await.unwrap_err();
    assert_eq!(err.to_string(), "404 Directory not found");

    let listing = backend.http.browse("/").await.unwrap();
    assert!(listing.is_root());
}

#[tokio::test]
async fn test_push_rejects_invalid_tree() {
    let backend = spawn_backend().await;

    let mut tree = mbird_core::TreeNode::new("root");
    tree.children.push(Arc::new(mbird_core::TreeNode::new("a")));
    tree.children.push(Arc::new(mbird_core::TreeNode::new("a")));
    let err = backend.http.push_tree(&tree).await.unwrap_err();
    assert_eq!(err.to_string(), "400 Duplicate node id: a");
}

#[tokio::test]
async fn test_load_requires_descriptor_in_directory() {
    let backend = spawn_backend().await;
    let workspace = TempDir::new().unwrap();
    let empty = workspace.path().join("empty.mbird");
    std::fs::create_dir(&empty).unwrap();

    let workflow = AcquisitionWorkflow::new(backend.http.clone(), Arc::new(LocalAccess));
    workflow.choose_mode(ProjectMode::Load).unwrap();

    let state = workflow.submit(&empty.display().to_string()).await.unwrap();
    let AcquisitionState::Failed { mode, message } = state else {
        panic!("expected Failed, got {:?}", state);
    };
    assert_eq!(mode, ProjectMode::Load);
    assert_eq!(message, "Failed to load project: tree.json not found in selected directory");

    mbird_core::save_project(&mbird_core::TreeNode::new("root"), &empty).unwrap();
    let state = workflow.submit(&empty.display().to_string()).await.unwrap();
    let AcquisitionState::Loaded(handle) = state else {
        panic!("expected Loaded, got {:?}", state);
    };
    assert!(handle.descriptor.is_some());
}
