//! HTTP + WebSocket backend for the mbird console

pub mod error;
pub mod filesystem;
pub mod handlers;
pub mod router;
pub mod websocket;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use mbird_core::{ConsoleConfig, GraphDocument, TreeNode};
use tokio::net::TcpListener;
use tokio::sync::{RwLock, broadcast};

pub use error::ApiError;
pub use router::create_router;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// The project currently open on the backend.
#[derive(Debug, Clone)]
pub struct Project {
    pub root: Arc<TreeNode>,
    /// `None` when the tree was pushed without a create or load.
    pub path: Option<PathBuf>,
}

/// Shared state behind every handler.
pub struct ServerState {
    pub project: RwLock<Option<Project>>,
    pub last_saved: RwLock<Option<DateTime<Utc>>>,
    pub graph: RwLock<GraphDocument>,
    pub console: ConsoleConfig,
    /// Serialized `WsMessage`s for WebSocket subscribers.
    pub tree_tx: broadcast::Sender<String>,
}

impl ServerState {
    pub fn new(console: ConsoleConfig) -> Self {
        let (tree_tx, _) = broadcast::channel(64);
        Self {
            project: RwLock::new(None),
            last_saved: RwLock::new(None),
            graph: RwLock::new(GraphDocument::new()),
            console,
            tree_tx,
        }
    }

    /// Send to every subscriber. Having none is not an error.
    pub fn broadcast(&self, msg: String) -> usize {
        self.tree_tx.send(msg).unwrap_or(0)
    }
}

pub struct MbirdServer {
    state: Arc<ServerState>,
    config: ServerConfig,
}

impl MbirdServer {
    pub fn new(console: ConsoleConfig, config: ServerConfig) -> Self {
        Self {
            state: Arc::new(ServerState::new(console)),
            config,
        }
    }

    pub fn state(&self) -> Arc<ServerState> {
        Arc::clone(&self.state)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Bind and serve until the process exits.
    pub async fn start(self) -> anyhow::Result<()> {
        let listener = TcpListener::bind(self.address()).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener.
    pub async fn serve(self, listener: TcpListener) -> anyhow::Result<()> {
        let addr: SocketAddr = listener.local_addr()?;
        tracing::info!("mbird backend listening on http://{}", addr);
        axum::serve(listener, create_router(self.state)).await?;
        Ok(())
    }
}
