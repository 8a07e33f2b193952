//! HTTP + WebSocket server owning the authoritative course graphs
//!
//! Edge edits are applied under the catalog write lock, so the two endpoint
//! rows of an edge always commit together — the dual-write race the
//! client-driven design suffered from cannot occur here.

pub mod handlers;
pub mod router;
pub mod ws;

use std::collections::HashMap;
use std::sync::Arc;

use coursemap_core::{CourseGraph, DiffEngine, GraphDiff};
use tokio::sync::{broadcast, RwLock};

/// One course held by the server: its graph plus the diff sequencer.
pub struct CourseEntry {
    pub graph: CourseGraph,
    pub diffs: DiffEngine,
}

impl CourseEntry {
    pub fn new(graph: CourseGraph) -> Self {
        CourseEntry {
            graph,
            diffs: DiffEngine::new(),
        }
    }
}

/// Shared server state: the course catalog and the committed-diff channel.
pub struct ServerState {
    pub catalog: RwLock<HashMap<String, CourseEntry>>,
    pub diff_tx: broadcast::Sender<GraphDiff>,
}

impl ServerState {
    pub fn new() -> Self {
        let (diff_tx, _) = broadcast::channel(256);
        ServerState {
            catalog: RwLock::new(HashMap::new()),
            diff_tx,
        }
    }

    /// Add or replace a course graph.
    pub async fn insert_course(&self, graph: CourseGraph) {
        let code = graph.course_code().to_string();
        self.catalog.write().await.insert(code, CourseEntry::new(graph));
    }

    /// Broadcast a committed diff; returns how many subscribers saw it.
    pub fn broadcast(&self, diff: GraphDiff) -> usize {
        self.diff_tx.send(diff).unwrap_or(0)
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Bind address configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// The coursemap server.
pub struct CoursemapServer {
    state: Arc<ServerState>,
    config: ServerConfig,
}

impl CoursemapServer {
    pub fn new(config: ServerConfig) -> Self {
        CoursemapServer {
            state: Arc::new(ServerState::new()),
            config,
        }
    }

    pub fn state(&self) -> Arc<ServerState> {
        Arc::clone(&self.state)
    }

    /// Serve until the process is stopped.
    pub async fn start(self) -> anyhow::Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let app = router::create_router(self.state);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("listening on {}", addr);
        axum::serve(listener, app).await?;
        Ok(())
    }
}
