//! WebSocket channel pushing tree updates to connected editors

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use mbird_core::TreeNode;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::ServerState;

/// WebSocket message types for client-server communication
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsMessage {
    /// Server sends the current tree after it changed, and on connect
    #[serde(rename = "tree_updated")]
    TreeUpdated { tree: Arc<TreeNode> },
    /// Client asks for the current tree again
    #[serde(rename = "request_tree")]
    RequestTree,
    /// Ping/pong for keepalive
    #[serde(rename = "ping")]
    Ping,
    #[serde(rename = "pong")]
    Pong,
    #[serde(rename = "error")]
    Error { message: String },
}

impl WsMessage {
    fn to_text(&self) -> Option<String> {
        match serde_json::to_string(self) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("Failed to serialize WebSocket message: {}", e);
                None
            }
        }
    }
}

async fn current_tree_message(state: &ServerState) -> Option<String> {
    let project = state.project.read().await;
    let tree = Arc::clone(&project.as_ref()?.root);
    WsMessage::TreeUpdated { tree }.to_text()
}

/// Handle WebSocket upgrade requests
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<ServerState>) {
    info!("New WebSocket connection established");

    let (mut sender, mut receiver) = socket.split();
    let mut updates = state.tree_tx.subscribe();
    // Replies to this client only.
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<String>();

    if let Some(text) = current_tree_message(&state).await {
        if sender.send(Message::Text(text)).await.is_err() {
            warn!("Failed to send initial tree to WebSocket client");
            return;
        }
    }

    let state_clone = Arc::clone(&state);
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    debug!("Received WebSocket message: {}", text);
                    let reply = match serde_json::from_str::<WsMessage>(&text) {
                        Ok(ws_msg) => handle_client_message(ws_msg, &state_clone).await,
                        Err(e) => WsMessage::Error {
                            message: format!("Invalid message: {}", e),
                        }
                        .to_text(),
                    };
                    if let Some(reply) = reply {
                        if reply_tx.send(reply).is_err() {
                            break;
                        }
                    }
                }
                Message::Close(_) => {
                    debug!("WebSocket client disconnected");
                    break;
                }
                _ => {}
            }
        }
    });

    let mut send_task = tokio::spawn(async move {
        loop {
            let text = tokio::select! {
                update = updates.recv() => match update {
                    Ok(text) => text,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("WebSocket client lagged behind by {} updates", skipped);
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                reply = reply_rx.recv() => match reply {
                    Some(text) => text,
                    None => break,
                },
            };
            if sender.send(Message::Text(text)).await.is_err() {
                debug!("Failed to send message to WebSocket client");
                break;
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    }

    info!("WebSocket connection closed");
}

/// Handle messages received from the WebSocket client. Returns the reply, if any.
async fn handle_client_message(msg: WsMessage, state: &ServerState) -> Option<String> {
    match msg {
        WsMessage::Ping => WsMessage::Pong.to_text(),
        WsMessage::RequestTree => match current_tree_message(state).await {
            Some(text) => Some(text),
            None => WsMessage::Error {
                message: "No project loaded".to_string(),
            }
            .to_text(),
        },
        other => {
            debug!("Ignoring client message: {:?}", other);
            None
        }
    }
}
