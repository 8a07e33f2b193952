//! Committed-change records broadcast to connected editors

use serde::{Deserialize, Serialize};

use crate::layout::Position;
use crate::model::{CourseModuleId, GraphEdge};

/// One committed change to a course graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GraphDiff {
    /// Monotonically increasing per-course sequence number.
    pub sequence: u64,
    pub course_code: String,
    pub added_edges: Vec<GraphEdge>,
    pub removed_edges: Vec<GraphEdge>,
    pub moved: Vec<NodeMove>,
    pub removed_nodes: Vec<CourseModuleId>,
}

/// A node repositioning, with the tier the move derived.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeMove {
    pub id: CourseModuleId,
    pub position: Position,
    pub complexity_level: u8,
}

impl GraphDiff {
    /// Empty diff for a course; the sequence is assigned on commit.
    pub fn new(course_code: &str) -> Self {
        GraphDiff {
            sequence: 0,
            course_code: course_code.to_string(),
            added_edges: Vec::new(),
            removed_edges: Vec::new(),
            moved: Vec::new(),
            removed_nodes: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added_edges.is_empty()
            && self.removed_edges.is_empty()
            && self.moved.is_empty()
            && self.removed_nodes.is_empty()
    }
}

/// Assigns commit sequence numbers to diffs.
#[derive(Debug, Default)]
pub struct DiffEngine {
    sequence: u64,
}

impl DiffEngine {
    pub fn new() -> Self {
        DiffEngine { sequence: 0 }
    }

    /// Stamp a diff with the next sequence number.
    pub fn stamp(&mut self, mut diff: GraphDiff) -> GraphDiff {
        self.sequence += 1;
        diff.sequence = self.sequence;
        diff
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}
