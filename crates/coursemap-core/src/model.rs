//! Core data structures for the prerequisite graph

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::layout::Position;

/// Unique catalog code of a module (e.g. "M-ALG-101").
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct ModuleCode(pub String);

impl ModuleCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleCode {
    fn from(s: &str) -> Self {
        ModuleCode(s.to_string())
    }
}

/// Numeric row id of a CourseModule. Distinct from the module code: the id
/// identifies the join row, the code identifies the catalog module.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct CourseModuleId(pub i64);

impl fmt::Display for CourseModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A catalog module. Immutable with respect to the graph: repositioning a
/// node never changes the module itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub code: ModuleCode,
    pub title: String,
    pub domain: String,
    pub credits: f32,
}

/// A module bound into a course's curriculum, carrying its place in the
/// prerequisite graph as adjacency sets of module codes.
///
/// `prev_module_codes` / `next_module_codes` use set semantics, so duplicate
/// entries are impossible by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseModule {
    pub id: CourseModuleId,
    pub course_code: String,
    pub module_code: ModuleCode,
    pub order: u32,
    pub level_of_study: String,
    /// Curriculum tier, nominally 1–5. Advisory: derived from horizontal
    /// position on move, never validated against edge direction.
    pub complexity_level: u8,
    /// Codes of direct prerequisites within the same course.
    pub prev_module_codes: BTreeSet<ModuleCode>,
    /// Codes of direct successors within the same course.
    pub next_module_codes: BTreeSet<ModuleCode>,
    /// Free-form layout coordinates, if the node has ever been dragged.
    #[serde(default)]
    pub position: Option<Position>,
    /// Embedded catalog module, when the store returns the join expanded.
    #[serde(default)]
    pub module: Option<Module>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl CourseModule {
    /// Minimal unconnected row, used by builders and tests.
    pub fn new(id: CourseModuleId, course_code: &str, module_code: ModuleCode) -> Self {
        CourseModule {
            id,
            course_code: course_code.to_string(),
            module_code,
            order: 0,
            level_of_study: String::new(),
            complexity_level: 1,
            prev_module_codes: BTreeSet::new(),
            next_module_codes: BTreeSet::new(),
            position: None,
            module: None,
            updated_at: Utc::now(),
        }
    }

    /// Record that the row changed.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// One renderable node, derived from a CourseModule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: CourseModuleId,
    pub module_code: ModuleCode,
    pub label: String,
    pub tier: u8,
    pub position: Position,
}

/// A directed prerequisite edge. Endpoints are structured fields; the
/// `"e<src>-<dst>"` string exists only as a Display rendering for API
/// consumers and is never parsed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub source: CourseModuleId,
    pub target: CourseModuleId,
}

impl fmt::Display for GraphEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}-{}", self.source, self.target)
    }
}
