//! Typed errors for graph construction and edits

use crate::model::{CourseModuleId, ModuleCode};

/// Everything that can go wrong while building or editing a course graph.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    #[error("no course module with id {0}")]
    UnknownNode(CourseModuleId),

    #[error("module code {code} appears on more than one course module")]
    DuplicateModuleCode { code: ModuleCode },

    #[error("module {referenced_by} references code {code}, which is not in this course")]
    DanglingReference {
        code: ModuleCode,
        referenced_by: ModuleCode,
    },

    #[error("a module cannot be its own prerequisite (id {0})")]
    SelfLoop(CourseModuleId),

    #[error("edge would create a prerequisite cycle: {}", format_path(.path))]
    WouldCycle { path: Vec<ModuleCode> },
}

fn format_path(path: &[ModuleCode]) -> String {
    path.iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}
