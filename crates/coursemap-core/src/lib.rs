//! Coursemap Core — prerequisite graph model, layout, and edit engine

pub mod audit;
pub mod diff;
pub mod edits;
pub mod error;
pub mod graph;
pub mod layout;
pub mod model;

#[cfg(test)]
pub mod tests;

pub use audit::{audit, AuditFinding};
pub use diff::{DiffEngine, GraphDiff, NodeMove};
pub use edits::{EdgeEdit, EdgeOp, EditOutcome, ModuleEdit};
pub use error::GraphError;
pub use graph::CourseGraph;
pub use layout::{Position, COLUMN_SPACING, ROW_SPACING, TIER_COUNT, TIER_LABELS};
pub use model::{CourseModule, CourseModuleId, GraphEdge, GraphNode, Module, ModuleCode};
