//! CLI command implementations

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use mbird_client::{HttpBackend, NavigationState, Navigator, ProjectMode};
use mbird_core::{ConsoleConfig, TreeModel, load_project, save_project};
use mbird_server::{MbirdServer, ServerConfig};

pub async fn serve(
    config_dir: Option<PathBuf>,
    host: String,
    port: u16,
    open: bool,
) -> anyhow::Result<()> {
    let console = match config_dir {
        Some(dir) => ConsoleConfig::new(dir),
        None => ConsoleConfig::from_env(),
    };
    tracing::info!("Console config: {}", console.dir().display());

    let server = MbirdServer::new(console, ServerConfig { host, port });
    if open {
        let url = format!("http://{}", server.address());
        if let Err(e) = open::that(&url) {
            tracing::warn!("Cannot open browser at {}: {}", url, e);
        }
    }
    server.start().await
}

pub async fn browse(backend: Option<String>, path: Option<String>) -> anyhow::Result<()> {
    let backend = match backend {
        Some(url) => HttpBackend::new(url),
        None => HttpBackend::from_env(),
    };
    tracing::debug!("Browsing through {}", backend.base_url());

    let navigator = Navigator::new(Arc::new(backend), ProjectMode::Load);
    match path {
        Some(path) => navigator.navigate(&path).await,
        None => navigator.start().await,
    };

    match navigator.state() {
        NavigationState::Ready(listing) => {
            println!("{}", listing.current);
            if let Some(parent) = &listing.parent {
                println!("  .. ({})", parent);
            }
            for entry in &listing.directories {
                println!("  {}/", entry.name);
            }
            Ok(())
        }
        NavigationState::Error(message) => anyhow::bail!("Cannot browse: {}", message),
        NavigationState::Loading => anyhow::bail!("Navigation did not complete"),
    }
}

pub fn tree(dir: &Path) -> anyhow::Result<()> {
    let tree = load_project(dir).with_context(|| format!("loading {}", dir.display()))?;
    print!("{}", tree);
    Ok(())
}

pub fn add_child(dir: &Path, parent: &str, id: &str) -> anyhow::Result<()> {
    let tree = load_project(dir).with_context(|| format!("loading {}", dir.display()))?;
    let mut model = TreeModel::new(tree);
    let updated = model.apply_add_child(parent, id)?;
    let written = save_project(&updated, dir)?;
    tracing::info!("Added {} under {} in {}", id, parent, written.display());
    print!("{}", updated);
    Ok(())
}
