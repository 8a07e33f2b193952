//! Pure edit engine for the prerequisite graph
//!
//! Every operation mutates local graph state atomically and returns the
//! snapshot of each row it touched, so callers can persist exactly what
//! changed and report the outcome. Both adjacency sides of an edge are
//! always updated together; there is no code path that updates one.

use std::collections::BTreeSet;

use petgraph::algo::astar;
use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::graph::CourseGraph;
use crate::layout;
use crate::model::{CourseModule, CourseModuleId, GraphEdge, ModuleCode};

/// Result of one local edit.
#[derive(Debug, Clone, PartialEq)]
pub struct EditOutcome {
    /// False when the edit was a no-op (edge already present / already absent).
    pub applied: bool,
    /// Snapshots of every row the edit changed, ready for persistence.
    pub dirty: Vec<CourseModule>,
}

impl EditOutcome {
    fn noop() -> Self {
        EditOutcome {
            applied: false,
            dirty: Vec::new(),
        }
    }
}

/// One logical edge edit, carried as a single unit so a backing store can
/// apply both endpoint updates transactionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeEdit {
    pub op: EdgeOp,
    pub source: CourseModuleId,
    pub target: CourseModuleId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeOp {
    Connect,
    Disconnect,
}

/// Full row body of the module-edit operation, shared by the HTTP client and
/// the server endpoint so the two cannot drift on the wire format. Layout
/// coordinates travel as flat `positionX`/`positionY` fields, not the nested
/// position object the row itself serializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleEdit {
    pub id: CourseModuleId,
    pub course_code: String,
    pub module_code: ModuleCode,
    pub order: u32,
    pub level_of_study: String,
    pub complexity_level: u8,
    #[serde(default)]
    pub prev_module_codes: BTreeSet<ModuleCode>,
    #[serde(default)]
    pub next_module_codes: BTreeSet<ModuleCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_y: Option<f32>,
}

impl From<&CourseModule> for ModuleEdit {
    fn from(row: &CourseModule) -> Self {
        ModuleEdit {
            id: row.id,
            course_code: row.course_code.clone(),
            module_code: row.module_code.clone(),
            order: row.order,
            level_of_study: row.level_of_study.clone(),
            complexity_level: row.complexity_level,
            prev_module_codes: row.prev_module_codes.clone(),
            next_module_codes: row.next_module_codes.clone(),
            position_x: row.position.map(|p| p.x),
            position_y: row.position.map(|p| p.y),
        }
    }
}

impl CourseGraph {
    /// Add a prerequisite edge: `source` becomes a direct prerequisite of
    /// `target`. Inserts the matching code into both endpoints' adjacency
    /// sets. Idempotent: re-adding an existing edge is a no-op.
    ///
    /// Rejects self-loops and any edge that would close a directed cycle.
    pub fn add_edge(
        &mut self,
        source: CourseModuleId,
        target: CourseModuleId,
    ) -> Result<EditOutcome, GraphError> {
        if source == target {
            return Err(GraphError::SelfLoop(source));
        }
        let s = self.index_of(source)?;
        let t = self.index_of(target)?;
        if self.inner.find_edge(s, t).is_some() {
            return Ok(EditOutcome::noop());
        }

        // A path from target back to source means the new edge closes a cycle.
        if let Some((_, hops)) = astar(&self.inner, t, |n| n == s, |_| 1u32, |_| 0u32) {
            let mut path: Vec<ModuleCode> = hops
                .iter()
                .filter_map(|&n| self.inner.node_weight(n))
                .map(|row| row.module_code.clone())
                .collect();
            path.push(self.inner[t].module_code.clone());
            return Err(GraphError::WouldCycle { path });
        }

        let source_code = self.inner[s].module_code.clone();
        let target_code = self.inner[t].module_code.clone();
        {
            let row = &mut self.inner[s];
            row.next_module_codes.insert(target_code);
            row.touch();
        }
        {
            let row = &mut self.inner[t];
            row.prev_module_codes.insert(source_code);
            row.touch();
        }
        self.inner.add_edge(s, t, GraphEdge { source, target });

        Ok(EditOutcome {
            applied: true,
            dirty: vec![self.inner[s].clone(), self.inner[t].clone()],
        })
    }

    /// Remove a prerequisite edge — the exact inverse of [`add_edge`]:
    /// filters the matching code out of both endpoints' adjacency sets.
    /// Removing an absent edge is a no-op.
    ///
    /// [`add_edge`]: CourseGraph::add_edge
    pub fn remove_edge(
        &mut self,
        source: CourseModuleId,
        target: CourseModuleId,
    ) -> Result<EditOutcome, GraphError> {
        let s = self.index_of(source)?;
        let t = self.index_of(target)?;
        let Some(edge) = self.inner.find_edge(s, t) else {
            return Ok(EditOutcome::noop());
        };

        let source_code = self.inner[s].module_code.clone();
        let target_code = self.inner[t].module_code.clone();
        {
            let row = &mut self.inner[s];
            row.next_module_codes.remove(&target_code);
            row.touch();
        }
        {
            let row = &mut self.inner[t];
            row.prev_module_codes.remove(&source_code);
            row.touch();
        }
        let _ = self.inner.remove_edge(edge);

        Ok(EditOutcome {
            applied: true,
            dirty: vec![self.inner[s].clone(), self.inner[t].clone()],
        })
    }

    /// Dispatch a carried [`EdgeEdit`].
    pub fn apply_edge_edit(&mut self, edit: EdgeEdit) -> Result<EditOutcome, GraphError> {
        match edit.op {
            EdgeOp::Connect => self.add_edge(edit.source, edit.target),
            EdgeOp::Disconnect => self.remove_edge(edit.source, edit.target),
        }
    }

    /// Store a node's new layout position and re-derive its complexity tier
    /// from the horizontal coordinate.
    pub fn move_node(
        &mut self,
        id: CourseModuleId,
        x: f32,
        y: f32,
    ) -> Result<EditOutcome, GraphError> {
        let idx = self.index_of(id)?;
        let row = &mut self.inner[idx];
        row.position = Some(layout::Position { x, y });
        row.complexity_level = layout::tier_from_x(x);
        row.touch();

        Ok(EditOutcome {
            applied: true,
            dirty: vec![row.clone()],
        })
    }

    /// Remove a node from the course, detaching every incident edge first so
    /// sibling adjacency sets never dangle. The dirty set contains the former
    /// neighbors; the removed row itself is returned separately.
    pub fn remove_node(
        &mut self,
        id: CourseModuleId,
    ) -> Result<(CourseModule, EditOutcome), GraphError> {
        let idx = self.index_of(id)?;
        let code = self.inner[idx].module_code.clone();

        let preds = self.predecessors(id);
        let succs = self.successors(id);
        let mut dirty = Vec::with_capacity(preds.len() + succs.len());
        for pred in preds {
            let p = self.index_of(pred)?;
            let row = &mut self.inner[p];
            row.next_module_codes.remove(&code);
            row.touch();
            dirty.push(row.clone());
        }
        for succ in succs {
            let s = self.index_of(succ)?;
            let row = &mut self.inner[s];
            row.prev_module_codes.remove(&code);
            row.touch();
            dirty.push(row.clone());
        }

        // Drops the node's incident petgraph edges with it.
        let removed = self
            .inner
            .remove_node(idx)
            .ok_or(GraphError::UnknownNode(id))?;
        self.by_id.remove(&id);
        self.by_code.remove(&code);

        Ok((removed, EditOutcome { applied: true, dirty }))
    }
}
