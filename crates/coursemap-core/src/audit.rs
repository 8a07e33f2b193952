//! Offline integrity audit of persisted course-module rows
//!
//! Unlike [`CourseGraph::build`], which stops at the first hard error and
//! repairs what it can, the audit walks the whole data set and reports every
//! violation, for operators inspecting exported data.
//!
//! [`CourseGraph::build`]: crate::graph::CourseGraph::build

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::model::{CourseModule, ModuleCode};

/// One integrity violation found in a row set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditFinding {
    DuplicateCode {
        code: ModuleCode,
    },
    /// An adjacency entry references a code absent from the course.
    Dangling {
        referenced_by: ModuleCode,
        code: ModuleCode,
    },
    /// One side of an edge is recorded without its mirror.
    Asymmetric {
        from: ModuleCode,
        to: ModuleCode,
    },
    /// The prerequisite graph contains a directed cycle.
    Cycle {
        involves: ModuleCode,
    },
}

impl fmt::Display for AuditFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditFinding::DuplicateCode { code } => {
                write!(f, "module code {code} appears on more than one row")
            }
            AuditFinding::Dangling {
                referenced_by,
                code,
            } => write!(
                f,
                "{referenced_by} references {code}, which is not in the course"
            ),
            AuditFinding::Asymmetric { from, to } => write!(
                f,
                "edge {from} -> {to} is recorded on one side only"
            ),
            AuditFinding::Cycle { involves } => {
                write!(f, "prerequisite cycle involving {involves}")
            }
        }
    }
}

/// Check one course's rows for every invariant violation.
pub fn audit(rows: &[CourseModule]) -> Vec<AuditFinding> {
    let mut findings = Vec::new();

    let mut by_code: HashMap<&ModuleCode, &CourseModule> = HashMap::new();
    for row in rows {
        if by_code.insert(&row.module_code, row).is_some() {
            findings.push(AuditFinding::DuplicateCode {
                code: row.module_code.clone(),
            });
        }
    }

    for row in rows {
        for code in row.prev_module_codes.iter().chain(&row.next_module_codes) {
            if !by_code.contains_key(code) {
                findings.push(AuditFinding::Dangling {
                    referenced_by: row.module_code.clone(),
                    code: code.clone(),
                });
            }
        }
    }

    for row in rows {
        for next in &row.next_module_codes {
            if let Some(succ) = by_code.get(next) {
                if !succ.prev_module_codes.contains(&row.module_code) {
                    findings.push(AuditFinding::Asymmetric {
                        from: row.module_code.clone(),
                        to: next.clone(),
                    });
                }
            }
        }
        for prev in &row.prev_module_codes {
            if let Some(pred) = by_code.get(prev) {
                if !pred.next_module_codes.contains(&row.module_code) {
                    findings.push(AuditFinding::Asymmetric {
                        from: prev.clone(),
                        to: row.module_code.clone(),
                    });
                }
            }
        }
    }

    if let Some(involves) = find_cycle(rows) {
        findings.push(AuditFinding::Cycle { involves });
    }

    findings
}

/// Depth-first cycle scan over the next-code adjacency; returns one module
/// on a cycle, if any.
fn find_cycle(rows: &[CourseModule]) -> Option<ModuleCode> {
    let by_code: HashMap<&ModuleCode, &CourseModule> =
        rows.iter().map(|row| (&row.module_code, row)).collect();

    let mut done: HashSet<&ModuleCode> = HashSet::new();
    for start in rows {
        if done.contains(&start.module_code) {
            continue;
        }
        // Iterative DFS with an explicit on-path set.
        let mut on_path: HashSet<&ModuleCode> = HashSet::new();
        let mut stack: Vec<(&CourseModule, bool)> = vec![(start, false)];
        while let Some((row, leaving)) = stack.pop() {
            if leaving {
                on_path.remove(&row.module_code);
                done.insert(&row.module_code);
                continue;
            }
            if on_path.contains(&row.module_code) {
                return Some(row.module_code.clone());
            }
            if done.contains(&row.module_code) {
                continue;
            }
            on_path.insert(&row.module_code);
            stack.push((row, true));
            for next in &row.next_module_codes {
                if let Some(&succ) = by_code.get(next) {
                    stack.push((succ, false));
                }
            }
        }
    }
    None
}
