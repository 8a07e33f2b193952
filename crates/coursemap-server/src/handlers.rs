//! REST API handlers for the coursemap server

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use coursemap_core::{
    CourseModule, CourseModuleId, EdgeEdit, EdgeOp, GraphDiff, GraphEdge, GraphError, GraphNode,
    ModuleEdit, NodeMove,
};
use serde::Serialize;

use crate::ServerState;

/// Renderable graph for the editor client.
#[derive(Debug, Serialize)]
pub struct GraphResponse {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// JSON error body; every rejection names its violation.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// A handler failure with its HTTP status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    fn unknown_course(course_code: &str) -> Self {
        ApiError {
            status: StatusCode::NOT_FOUND,
            message: format!("course {course_code} not found"),
        }
    }

    fn rejected(message: String) -> Self {
        ApiError {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message,
        }
    }
}

impl From<GraphError> for ApiError {
    fn from(err: GraphError) -> Self {
        let status = match err {
            GraphError::UnknownNode(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        };
        ApiError {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// List a course's module rows.
pub async fn get_modules(
    State(state): State<Arc<ServerState>>,
    Path(course_code): Path<String>,
) -> Result<Json<Vec<CourseModule>>, ApiError> {
    let catalog = state.catalog.read().await;
    let entry = catalog
        .get(&course_code)
        .ok_or_else(|| ApiError::unknown_course(&course_code))?;
    Ok(Json(entry.graph.snapshot()))
}

/// Derived node/edge sets, positioned and ready to render.
pub async fn get_graph(
    State(state): State<Arc<ServerState>>,
    Path(course_code): Path<String>,
) -> Result<Json<GraphResponse>, ApiError> {
    let catalog = state.catalog.read().await;
    let entry = catalog
        .get(&course_code)
        .ok_or_else(|| ApiError::unknown_course(&course_code))?;
    let (nodes, edges) = entry.graph.render();
    Ok(Json(GraphResponse { nodes, edges }))
}

/// Update one row's metadata and position. The body is the [`ModuleEdit`]
/// wire type the HTTP client sends. Adjacency sets are carried for wire
/// compatibility but must match the stored row: edges are edited only
/// through the edge operation, never by rewriting one side's arrays. A
/// position change re-derives the complexity tier from the new x coordinate.
pub async fn put_module(
    State(state): State<Arc<ServerState>>,
    Path((course_code, id)): Path<(String, i64)>,
    Json(body): Json<ModuleEdit>,
) -> Result<Json<CourseModule>, ApiError> {
    let id = CourseModuleId(id);
    if body.id != id {
        return Err(ApiError::rejected(format!(
            "body id {} does not match path id {}",
            body.id, id
        )));
    }

    let mut catalog = state.catalog.write().await;
    let entry = catalog
        .get_mut(&course_code)
        .ok_or_else(|| ApiError::unknown_course(&course_code))?;

    let current = entry
        .graph
        .node(id)
        .ok_or(GraphError::UnknownNode(id))?
        .clone();
    if body.prev_module_codes != current.prev_module_codes
        || body.next_module_codes != current.next_module_codes
    {
        return Err(ApiError::rejected(
            "adjacency is edited through the edge operation, not the module edit".to_string(),
        ));
    }

    // Validate the position pair before any state is touched.
    let position = match (body.position_x, body.position_y) {
        (Some(x), Some(y)) => Some((x, y)),
        (None, None) => None,
        (Some(_), None) => {
            return Err(ApiError::rejected(
                "position is missing positionY; both coordinates are required".to_string(),
            ));
        }
        (None, Some(_)) => {
            return Err(ApiError::rejected(
                "position is missing positionX; both coordinates are required".to_string(),
            ));
        }
    };

    let mut row = current;
    row.order = body.order;
    row.level_of_study = body.level_of_study;
    row.complexity_level = body.complexity_level;
    row.touch();
    entry.graph.restore_node(row)?;

    let mut diff = GraphDiff::new(&course_code);
    if let Some((x, y)) = position {
        entry.graph.move_node(id, x, y)?;
        let moved = entry.graph.node(id).ok_or(GraphError::UnknownNode(id))?;
        diff.moved.push(NodeMove {
            id,
            position: moved.position.unwrap_or_default(),
            complexity_level: moved.complexity_level,
        });
    }

    if !diff.is_empty() {
        let diff = entry.diffs.stamp(diff);
        state.broadcast(diff);
    }

    let updated = entry
        .graph
        .node(id)
        .cloned()
        .ok_or(GraphError::UnknownNode(id))?;
    Ok(Json(updated))
}

/// Apply one logical edge edit. Both endpoint rows are updated under the
/// write lock, so they commit together or not at all; returns the updated
/// rows (empty when the edit was already applied).
pub async fn post_edge(
    State(state): State<Arc<ServerState>>,
    Path(course_code): Path<String>,
    Json(edit): Json<EdgeEdit>,
) -> Result<Json<Vec<CourseModule>>, ApiError> {
    let mut catalog = state.catalog.write().await;
    let entry = catalog
        .get_mut(&course_code)
        .ok_or_else(|| ApiError::unknown_course(&course_code))?;

    let outcome = entry.graph.apply_edge_edit(edit)?;
    if outcome.applied {
        let mut diff = GraphDiff::new(&course_code);
        let edge = GraphEdge {
            source: edit.source,
            target: edit.target,
        };
        match edit.op {
            EdgeOp::Connect => diff.added_edges.push(edge),
            EdgeOp::Disconnect => diff.removed_edges.push(edge),
        }
        let diff = entry.diffs.stamp(diff);
        state.broadcast(diff);
    }

    Ok(Json(outcome.dirty))
}

/// Remove a module from the course, detaching every incident edge; returns
/// the updated former-neighbor rows.
pub async fn delete_module(
    State(state): State<Arc<ServerState>>,
    Path((course_code, id)): Path<(String, i64)>,
) -> Result<Json<Vec<CourseModule>>, ApiError> {
    let id = CourseModuleId(id);
    let mut catalog = state.catalog.write().await;
    let entry = catalog
        .get_mut(&course_code)
        .ok_or_else(|| ApiError::unknown_course(&course_code))?;

    let mut diff = GraphDiff::new(&course_code);
    for source in entry.graph.predecessors(id) {
        diff.removed_edges.push(GraphEdge { source, target: id });
    }
    for target in entry.graph.successors(id) {
        diff.removed_edges.push(GraphEdge { source: id, target });
    }
    diff.removed_nodes.push(id);

    let (_removed, outcome) = entry.graph.remove_node(id)?;
    let diff = entry.diffs.stamp(diff);
    state.broadcast(diff);

    Ok(Json(outcome.dirty))
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    let health = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    Json(health)
}
