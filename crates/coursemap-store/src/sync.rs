//! Drives edits end-to-end: local graph, remote store, reported outcome
//!
//! Every mutating operation returns a [`PersistOutcome`] so the caller always
//! knows whether the remote store committed the edit. Nothing is swallowed
//! into a log: a failed persistence call rolls the local edit back, so local
//! and remote state cannot silently diverge.

use std::sync::Arc;

use coursemap_core::{
    CourseGraph, CourseModule, CourseModuleId, EdgeEdit, EdgeOp, GraphError,
};
use tracing::warn;

use crate::{ModuleStore, StoreError};

/// Validation failures (local) or load failures (remote) of a session.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Persistence outcome of one edit, surfaced to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistOutcome {
    /// The edit changed nothing locally (already applied); no remote call.
    NoOp,
    /// The remote store committed every touched row.
    Committed { updated: Vec<CourseModule> },
    /// Some rows persisted and some did not; lists exactly which. The local
    /// graph keeps the edit — callers decide whether to retry the failures.
    PartialFailure {
        persisted: Vec<CourseModuleId>,
        failed: Vec<(CourseModuleId, String)>,
    },
    /// Nothing persisted; the local edit was rolled back.
    Failed { error: String },
}

/// An editing session over one course's graph, backed by a remote store.
pub struct SyncSession {
    graph: CourseGraph,
    store: Arc<dyn ModuleStore>,
}

impl SyncSession {
    /// Fetch a course from the store and build its graph.
    pub async fn load(store: Arc<dyn ModuleStore>, course_code: &str) -> Result<Self, SyncError> {
        let rows = store.fetch_modules(course_code).await?;
        let graph = CourseGraph::build(course_code, rows)?;
        Ok(SyncSession { graph, store })
    }

    pub fn graph(&self) -> &CourseGraph {
        &self.graph
    }

    /// Make `source` a direct prerequisite of `target`.
    pub async fn connect(
        &mut self,
        source: CourseModuleId,
        target: CourseModuleId,
    ) -> Result<PersistOutcome, SyncError> {
        self.edge_edit(EdgeEdit {
            op: EdgeOp::Connect,
            source,
            target,
        })
        .await
    }

    /// Remove the prerequisite edge between `source` and `target`.
    pub async fn disconnect(
        &mut self,
        source: CourseModuleId,
        target: CourseModuleId,
    ) -> Result<PersistOutcome, SyncError> {
        self.edge_edit(EdgeEdit {
            op: EdgeOp::Disconnect,
            source,
            target,
        })
        .await
    }

    async fn edge_edit(&mut self, edit: EdgeEdit) -> Result<PersistOutcome, SyncError> {
        let outcome = self.graph.apply_edge_edit(edit)?;
        if !outcome.applied {
            return Ok(PersistOutcome::NoOp);
        }

        let course = self.graph.course_code().to_string();
        match self.store.apply_edge(&course, edit).await {
            Ok(updated) => Ok(PersistOutcome::Committed { updated }),
            Err(err) => {
                let inverse = EdgeEdit {
                    op: match edit.op {
                        EdgeOp::Connect => EdgeOp::Disconnect,
                        EdgeOp::Disconnect => EdgeOp::Connect,
                    },
                    ..edit
                };
                if let Err(rollback) = self.graph.apply_edge_edit(inverse) {
                    warn!(course = %course, error = %rollback, "rollback after failed persist did not apply");
                }
                Ok(PersistOutcome::Failed {
                    error: err.to_string(),
                })
            }
        }
    }

    /// Reposition a node; its complexity tier is re-derived from the new x.
    pub async fn move_node(
        &mut self,
        id: CourseModuleId,
        x: f32,
        y: f32,
    ) -> Result<PersistOutcome, SyncError> {
        let before = self
            .graph
            .node(id)
            .cloned()
            .ok_or(GraphError::UnknownNode(id))?;
        let outcome = self.graph.move_node(id, x, y)?;
        let row = &outcome.dirty[0];

        let course = self.graph.course_code().to_string();
        match self.store.update_module(&course, row).await {
            Ok(stored) => Ok(PersistOutcome::Committed {
                updated: vec![stored],
            }),
            Err(err) => {
                self.graph.restore_node(before)?;
                Ok(PersistOutcome::Failed {
                    error: err.to_string(),
                })
            }
        }
    }

    /// Remove a node from the course. The remote row is deleted first; the
    /// detached neighbors are then persisted one by one, and any neighbor
    /// that fails to persist is reported, not silently dropped.
    pub async fn remove(&mut self, id: CourseModuleId) -> Result<PersistOutcome, SyncError> {
        if self.graph.node(id).is_none() {
            return Err(GraphError::UnknownNode(id).into());
        }

        let course = self.graph.course_code().to_string();
        if let Err(err) = self.store.delete_module(&course, id).await {
            return Ok(PersistOutcome::Failed {
                error: err.to_string(),
            });
        }

        let (_removed, outcome) = self.graph.remove_node(id)?;
        let mut persisted = Vec::new();
        let mut failed: Vec<(CourseModuleId, String)> = Vec::new();
        for row in &outcome.dirty {
            match self.store.update_module(&course, row).await {
                Ok(_) => persisted.push(row.id),
                Err(err) => failed.push((row.id, err.to_string())),
            }
        }

        if failed.is_empty() {
            Ok(PersistOutcome::Committed {
                updated: outcome.dirty,
            })
        } else {
            Ok(PersistOutcome::PartialFailure { persisted, failed })
        }
    }
}

impl std::fmt::Debug for SyncSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncSession")
            .field("graph", &self.graph)
            .field("store", &self.store.name())
            .finish()
    }
}
