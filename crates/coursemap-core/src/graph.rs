//! Graph wrapper using petgraph::StableDiGraph keyed by course-module row id

use std::collections::HashMap;

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::Direction;
use tracing::warn;

use crate::error::GraphError;
use crate::layout;
use crate::model::*;

/// One course's prerequisite graph — a directed graph with stable node
/// indices, plus lookup maps from row id and module code.
pub struct CourseGraph {
    pub(crate) course_code: String,
    pub(crate) inner: StableDiGraph<CourseModule, GraphEdge>,
    pub(crate) by_id: HashMap<CourseModuleId, NodeIndex>,
    pub(crate) by_code: HashMap<ModuleCode, CourseModuleId>,
}

impl std::fmt::Debug for CourseGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CourseGraph")
            .field("course_code", &self.course_code)
            .field("module_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl CourseGraph {
    /// Empty graph for a course.
    pub fn new(course_code: &str) -> Self {
        CourseGraph {
            course_code: course_code.to_string(),
            inner: StableDiGraph::new(),
            by_id: HashMap::new(),
            by_code: HashMap::new(),
        }
    }

    /// Build a graph from persisted course-module rows.
    ///
    /// Rejects duplicate module codes and adjacency entries that reference a
    /// code absent from the list (a lookup miss is an error, never a silently
    /// dropped edge). Asymmetric adjacency in legacy data — A lists B as next
    /// but B does not list A as prev — is repaired by union and logged.
    pub fn build(course_code: &str, mut rows: Vec<CourseModule>) -> Result<Self, GraphError> {
        let mut by_code: HashMap<ModuleCode, CourseModuleId> = HashMap::new();
        for row in &rows {
            if by_code.insert(row.module_code.clone(), row.id).is_some() {
                return Err(GraphError::DuplicateModuleCode {
                    code: row.module_code.clone(),
                });
            }
        }

        for row in &rows {
            for code in row.prev_module_codes.iter().chain(&row.next_module_codes) {
                if !by_code.contains_key(code) {
                    return Err(GraphError::DanglingReference {
                        code: code.clone(),
                        referenced_by: row.module_code.clone(),
                    });
                }
            }
        }

        let slot_of: HashMap<ModuleCode, usize> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| (row.module_code.clone(), i))
            .collect();

        // Repair asymmetric pairs before any edges are materialized.
        for i in 0..rows.len() {
            let code = rows[i].module_code.clone();
            let nexts: Vec<ModuleCode> = rows[i].next_module_codes.iter().cloned().collect();
            let prevs: Vec<ModuleCode> = rows[i].prev_module_codes.iter().cloned().collect();
            for next in nexts {
                let j = slot_of[&next];
                if rows[j].prev_module_codes.insert(code.clone()) {
                    warn!(course = course_code, from = %code, to = %next,
                        "repaired asymmetric adjacency: successor was missing prev entry");
                }
            }
            for prev in prevs {
                let j = slot_of[&prev];
                if rows[j].next_module_codes.insert(code.clone()) {
                    warn!(course = course_code, from = %prev, to = %code,
                        "repaired asymmetric adjacency: predecessor was missing next entry");
                }
            }
        }

        let mut edge_pairs: Vec<(CourseModuleId, CourseModuleId)> = Vec::new();
        for row in &rows {
            for code in &row.next_module_codes {
                edge_pairs.push((row.id, by_code[code]));
            }
        }

        let mut graph = CourseGraph::new(course_code);
        graph.by_code = by_code;
        for row in rows {
            let id = row.id;
            let idx = graph.inner.add_node(row);
            graph.by_id.insert(id, idx);
        }
        for (source, target) in edge_pairs {
            let edge = GraphEdge { source, target };
            graph
                .inner
                .add_edge(graph.by_id[&source], graph.by_id[&target], edge);
        }

        Ok(graph)
    }

    pub fn course_code(&self) -> &str {
        &self.course_code
    }

    pub(crate) fn index_of(&self, id: CourseModuleId) -> Result<NodeIndex, GraphError> {
        self.by_id.get(&id).copied().ok_or(GraphError::UnknownNode(id))
    }

    /// Get a row by id.
    pub fn node(&self, id: CourseModuleId) -> Option<&CourseModule> {
        let idx = *self.by_id.get(&id)?;
        self.inner.node_weight(idx)
    }

    /// Resolve a module code to its row id.
    pub fn id_of_code(&self, code: &ModuleCode) -> Option<CourseModuleId> {
        self.by_code.get(code).copied()
    }

    /// Total number of course modules.
    pub fn module_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Total number of prerequisite edges.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Iterate over all rows.
    pub fn modules(&self) -> impl Iterator<Item = &CourseModule> {
        self.inner
            .node_indices()
            .filter_map(move |idx| self.inner.node_weight(idx))
    }

    /// Iterate over all edges.
    pub fn edges(&self) -> impl Iterator<Item = GraphEdge> + '_ {
        self.inner
            .edge_indices()
            .filter_map(move |idx| self.inner.edge_weight(idx).copied())
    }

    /// Whether a direct edge exists between two rows.
    pub fn contains_edge(&self, source: CourseModuleId, target: CourseModuleId) -> bool {
        match (self.by_id.get(&source), self.by_id.get(&target)) {
            (Some(&s), Some(&t)) => self.inner.find_edge(s, t).is_some(),
            _ => false,
        }
    }

    /// Ids of a row's direct predecessors (its prerequisites).
    pub fn predecessors(&self, id: CourseModuleId) -> Vec<CourseModuleId> {
        self.neighbor_ids(id, Direction::Incoming)
    }

    /// Ids of a row's direct successors.
    pub fn successors(&self, id: CourseModuleId) -> Vec<CourseModuleId> {
        self.neighbor_ids(id, Direction::Outgoing)
    }

    fn neighbor_ids(&self, id: CourseModuleId, dir: Direction) -> Vec<CourseModuleId> {
        let Some(&idx) = self.by_id.get(&id) else {
            return Vec::new();
        };
        self.inner
            .neighbors_directed(idx, dir)
            .filter_map(|n| self.inner.node_weight(n).map(|row| row.id))
            .collect()
    }

    /// Put back a previously taken row snapshot. Adjacency sets must be
    /// unchanged relative to the current graph; used by rollback paths after
    /// a failed persistence call.
    pub fn restore_node(&mut self, row: CourseModule) -> Result<(), GraphError> {
        let idx = self.index_of(row.id)?;
        self.inner[idx] = row;
        Ok(())
    }

    /// Snapshot all rows, sorted by id, ready to persist or serialize.
    pub fn snapshot(&self) -> Vec<CourseModule> {
        let mut rows: Vec<CourseModule> = self.modules().cloned().collect();
        rows.sort_by_key(|row| row.id);
        rows
    }

    /// Derive the renderable node and edge sets. Nodes with a stored position
    /// keep it; the rest are stacked into their tier's column in id order.
    pub fn render(&self) -> (Vec<GraphNode>, Vec<GraphEdge>) {
        let mut rows = self.snapshot();
        rows.sort_by_key(|row| (row.complexity_level, row.order, row.id));

        let mut ordinals: HashMap<u8, usize> = HashMap::new();
        let mut nodes = Vec::with_capacity(rows.len());
        for row in rows {
            let position = match row.position {
                Some(p) => p,
                None => {
                    let ordinal = ordinals.entry(row.complexity_level).or_insert(0);
                    let p = layout::position_for(row.complexity_level, *ordinal);
                    *ordinal += 1;
                    p
                }
            };
            let label = row
                .module
                .as_ref()
                .map(|m| m.title.clone())
                .unwrap_or_else(|| row.module_code.to_string());
            nodes.push(GraphNode {
                id: row.id,
                module_code: row.module_code,
                label,
                tier: row.complexity_level,
                position,
            });
        }

        (nodes, self.edges().collect())
    }
}
