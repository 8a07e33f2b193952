//! WebSocket handling for live graph updates
//!
//! A client connects for one course, receives the full graph once, then a
//! stream of committed diffs in sequence order.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
};
use coursemap_core::{CourseModule, GraphDiff, GraphEdge};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::ServerState;

/// Server-to-client messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsMessage {
    /// Full state of the course graph, sent once on connect.
    #[serde(rename = "full_graph")]
    FullGraph {
        modules: Vec<CourseModule>,
        edges: Vec<GraphEdge>,
        sequence: u64,
    },
    /// One committed edit.
    #[serde(rename = "graph_diff")]
    GraphDiff { diff: GraphDiff },
    /// Keepalive.
    #[serde(rename = "ping")]
    Ping,
    #[serde(rename = "pong")]
    Pong,
    /// Connection-level error, e.g. unknown course.
    #[serde(rename = "error")]
    Error { message: String },
}

/// Handle WebSocket upgrade requests
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(course_code): Path<String>,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, course_code, state))
}

/// Handle an individual WebSocket connection
async fn handle_socket(socket: WebSocket, course_code: String, state: Arc<ServerState>) {
    info!(course = course_code, "WebSocket connection established");

    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.diff_tx.subscribe();

    // Send the full graph immediately after connection.
    let full = {
        let catalog = state.catalog.read().await;
        match catalog.get(&course_code) {
            Some(entry) => WsMessage::FullGraph {
                modules: entry.graph.snapshot(),
                edges: entry.graph.edges().collect(),
                sequence: entry.diffs.sequence(),
            },
            None => WsMessage::Error {
                message: format!("course {course_code} not found"),
            },
        }
    };
    let closing = matches!(full, WsMessage::Error { .. });
    if let Ok(json) = serde_json::to_string(&full) {
        if sender.send(Message::Text(json)).await.is_err() || closing {
            return;
        }
    } else {
        warn!("failed to serialize full graph message");
        return;
    }

    // Answer pings from the client.
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<WsMessage>(&text) {
                    Ok(WsMessage::Ping) => debug!("received ping"),
                    Ok(other) => debug!("received message: {:?}", other),
                    Err(e) => warn!("failed to parse WebSocket message: {}", e),
                },
                Message::Close(_) => {
                    debug!("WebSocket client disconnected");
                    break;
                }
                _ => {}
            }
        }
    });

    // Forward committed diffs for this course.
    let course = course_code.clone();
    let mut send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(diff) if diff.course_code == course => {
                    let msg = WsMessage::GraphDiff { diff };
                    let Ok(json) = serde_json::to_string(&msg) else {
                        continue;
                    };
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "WebSocket client lagged behind");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
        }
        _ = (&mut recv_task) => {
            send_task.abort();
        }
    }

    info!(course = course_code, "WebSocket connection closed");
}
