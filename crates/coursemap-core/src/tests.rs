//! Unit tests for coursemap-core

use crate::error::GraphError;
use crate::layout;
use crate::model::*;
use crate::CourseGraph;

fn row(id: i64, code: &str) -> CourseModule {
    CourseModule::new(CourseModuleId(id), "SE-BSC", ModuleCode::from(code))
}

fn two_module_graph() -> CourseGraph {
    CourseGraph::build("SE-BSC", vec![row(1, "M1"), row(2, "M2")]).unwrap()
}

#[test]
fn add_edge_updates_both_adjacency_sets() {
    let mut graph = two_module_graph();

    let outcome = graph.add_edge(CourseModuleId(1), CourseModuleId(2)).unwrap();
    assert!(outcome.applied);
    assert_eq!(outcome.dirty.len(), 2);

    let m1 = graph.node(CourseModuleId(1)).unwrap();
    let m2 = graph.node(CourseModuleId(2)).unwrap();
    assert!(m1.next_module_codes.contains(&ModuleCode::from("M2")));
    assert!(m2.prev_module_codes.contains(&ModuleCode::from("M1")));
    assert!(m1.prev_module_codes.is_empty());
    assert!(m2.next_module_codes.is_empty());
    assert!(graph.contains_edge(CourseModuleId(1), CourseModuleId(2)));
}

#[test]
fn remove_edge_is_exact_inverse_of_add_edge() {
    let mut graph = two_module_graph();

    graph.add_edge(CourseModuleId(1), CourseModuleId(2)).unwrap();
    let outcome = graph
        .remove_edge(CourseModuleId(1), CourseModuleId(2))
        .unwrap();
    assert!(outcome.applied);

    let m1 = graph.node(CourseModuleId(1)).unwrap();
    let m2 = graph.node(CourseModuleId(2)).unwrap();
    assert!(m1.next_module_codes.is_empty());
    assert!(m2.prev_module_codes.is_empty());
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn add_edge_is_idempotent() {
    let mut graph = two_module_graph();

    graph.add_edge(CourseModuleId(1), CourseModuleId(2)).unwrap();
    let second = graph.add_edge(CourseModuleId(1), CourseModuleId(2)).unwrap();

    assert!(!second.applied);
    assert!(second.dirty.is_empty());
    assert_eq!(graph.edge_count(), 1);
    let m1 = graph.node(CourseModuleId(1)).unwrap();
    assert_eq!(m1.next_module_codes.len(), 1);
}

#[test]
fn remove_absent_edge_is_noop() {
    let mut graph = two_module_graph();
    let outcome = graph
        .remove_edge(CourseModuleId(1), CourseModuleId(2))
        .unwrap();
    assert!(!outcome.applied);
    assert!(outcome.dirty.is_empty());
}

#[test]
fn self_loop_is_rejected() {
    let mut graph = two_module_graph();
    let err = graph
        .add_edge(CourseModuleId(1), CourseModuleId(1))
        .unwrap_err();
    assert_eq!(err, GraphError::SelfLoop(CourseModuleId(1)));
}

#[test]
fn unknown_node_is_rejected() {
    let mut graph = two_module_graph();
    let err = graph
        .add_edge(CourseModuleId(1), CourseModuleId(99))
        .unwrap_err();
    assert_eq!(err, GraphError::UnknownNode(CourseModuleId(99)));
}

#[test]
fn cycle_is_rejected_with_witness_path() {
    let mut graph =
        CourseGraph::build("SE-BSC", vec![row(1, "M1"), row(2, "M2"), row(3, "M3")]).unwrap();
    graph.add_edge(CourseModuleId(1), CourseModuleId(2)).unwrap();
    graph.add_edge(CourseModuleId(2), CourseModuleId(3)).unwrap();

    let err = graph
        .add_edge(CourseModuleId(3), CourseModuleId(1))
        .unwrap_err();
    match err {
        GraphError::WouldCycle { path } => {
            assert!(path.len() >= 3);
            assert!(path.contains(&ModuleCode::from("M1")));
            assert!(path.contains(&ModuleCode::from("M3")));
        }
        other => panic!("expected WouldCycle, got {other:?}"),
    }
    // Rejection must leave adjacency untouched.
    let m3 = graph.node(CourseModuleId(3)).unwrap();
    assert!(m3.next_module_codes.is_empty());
}

#[test]
fn build_rejects_dangling_reference() {
    let mut bad = row(1, "M1");
    bad.next_module_codes.insert(ModuleCode::from("GHOST"));

    let err = CourseGraph::build("SE-BSC", vec![bad, row(2, "M2")]).unwrap_err();
    assert_eq!(
        err,
        GraphError::DanglingReference {
            code: ModuleCode::from("GHOST"),
            referenced_by: ModuleCode::from("M1"),
        }
    );
}

#[test]
fn build_rejects_duplicate_module_code() {
    let err = CourseGraph::build("SE-BSC", vec![row(1, "M1"), row(2, "M1")]).unwrap_err();
    assert_eq!(
        err,
        GraphError::DuplicateModuleCode {
            code: ModuleCode::from("M1"),
        }
    );
}

#[test]
fn build_repairs_asymmetric_adjacency() {
    // Legacy data: M1 lists M2 as next, but M2 never recorded M1 as prev.
    let mut m1 = row(1, "M1");
    m1.next_module_codes.insert(ModuleCode::from("M2"));

    let graph = CourseGraph::build("SE-BSC", vec![m1, row(2, "M2")]).unwrap();
    let m2 = graph.node(CourseModuleId(2)).unwrap();
    assert!(m2.prev_module_codes.contains(&ModuleCode::from("M1")));
    assert_eq!(graph.edge_count(), 1);
}

#[test]
fn build_restores_edges_from_adjacency() {
    let mut m1 = row(1, "M1");
    m1.next_module_codes.insert(ModuleCode::from("M2"));
    let mut m2 = row(2, "M2");
    m2.prev_module_codes.insert(ModuleCode::from("M1"));

    let graph = CourseGraph::build("SE-BSC", vec![m1, m2]).unwrap();
    assert_eq!(graph.edge_count(), 1);
    assert!(graph.contains_edge(CourseModuleId(1), CourseModuleId(2)));
    assert_eq!(graph.predecessors(CourseModuleId(2)), vec![CourseModuleId(1)]);
}

#[test]
fn move_node_derives_tier_from_x() {
    let mut graph = two_module_graph();

    let outcome = graph.move_node(CourseModuleId(1), 650.0, 80.0).unwrap();
    assert!(outcome.applied);

    let m1 = graph.node(CourseModuleId(1)).unwrap();
    assert_eq!(m1.complexity_level, 3); // floor(650 / 300) + 1
    assert_eq!(m1.position, Some(layout::Position { x: 650.0, y: 80.0 }));
}

#[test]
fn tier_is_clamped_to_valid_range() {
    assert_eq!(layout::tier_from_x(-50.0), 1);
    assert_eq!(layout::tier_from_x(0.0), 1);
    assert_eq!(layout::tier_from_x(5000.0), layout::TIER_COUNT);
}

#[test]
fn default_positions_round_trip_through_tier_derivation() {
    for tier in 1..=layout::TIER_COUNT {
        let pos = layout::position_for(tier, 0);
        assert_eq!(layout::tier_from_x(pos.x), tier, "tier {tier}");
    }
}

#[test]
fn remove_node_detaches_all_neighbors() {
    let mut graph =
        CourseGraph::build("SE-BSC", vec![row(1, "M1"), row(2, "M2"), row(3, "M3")]).unwrap();
    graph.add_edge(CourseModuleId(1), CourseModuleId(2)).unwrap();
    graph.add_edge(CourseModuleId(2), CourseModuleId(3)).unwrap();

    let (removed, outcome) = graph.remove_node(CourseModuleId(2)).unwrap();
    assert_eq!(removed.module_code, ModuleCode::from("M2"));
    assert_eq!(outcome.dirty.len(), 2);

    let m1 = graph.node(CourseModuleId(1)).unwrap();
    let m3 = graph.node(CourseModuleId(3)).unwrap();
    assert!(m1.next_module_codes.is_empty());
    assert!(m3.prev_module_codes.is_empty());
    assert_eq!(graph.module_count(), 2);
    assert_eq!(graph.edge_count(), 0);
    assert!(graph.node(CourseModuleId(2)).is_none());
}

#[test]
fn render_places_unpositioned_nodes_in_tier_columns() {
    let mut m1 = row(1, "M1");
    m1.complexity_level = 1;
    let mut m2 = row(2, "M2");
    m2.complexity_level = 3;
    let mut m3 = row(3, "M3");
    m3.complexity_level = 1;

    let graph = CourseGraph::build("SE-BSC", vec![m1, m2, m3]).unwrap();
    let (nodes, edges) = graph.render();
    assert_eq!(nodes.len(), 3);
    assert!(edges.is_empty());

    let by_id = |id: i64| {
        nodes
            .iter()
            .find(|n| n.id == CourseModuleId(id))
            .unwrap()
            .clone()
    };
    // Two tier-1 nodes stack in the same column, different rows.
    assert_eq!(by_id(1).position.x, by_id(3).position.x);
    assert_ne!(by_id(1).position.y, by_id(3).position.y);
    // The tier-3 node sits two columns over.
    assert_eq!(layout::tier_from_x(by_id(2).position.x), 3);
}

#[test]
fn render_prefers_stored_positions() {
    let mut m1 = row(1, "M1");
    m1.position = Some(layout::Position { x: 777.0, y: 12.0 });

    let graph = CourseGraph::build("SE-BSC", vec![m1, row(2, "M2")]).unwrap();
    let (nodes, _) = graph.render();
    let n1 = nodes.iter().find(|n| n.id == CourseModuleId(1)).unwrap();
    assert_eq!(n1.position, layout::Position { x: 777.0, y: 12.0 });
}

#[test]
fn edge_display_uses_synthetic_id_format() {
    let edge = GraphEdge {
        source: CourseModuleId(1),
        target: CourseModuleId(2),
    };
    assert_eq!(edge.to_string(), "e1-2");
}

#[test]
fn course_module_serializes_with_wire_field_names() {
    let mut m1 = row(1, "M1");
    m1.next_module_codes.insert(ModuleCode::from("M2"));

    let json = serde_json::to_string(&m1).unwrap();
    assert!(json.contains("\"prevModuleCodes\""));
    assert!(json.contains("\"nextModuleCodes\""));
    assert!(json.contains("\"complexityLevel\""));

    let back: CourseModule = serde_json::from_str(&json).unwrap();
    assert_eq!(back, m1);
}

#[test]
fn module_edit_wire_flattens_position() {
    use crate::edits::ModuleEdit;

    let mut m1 = row(1, "M1");
    m1.position = Some(layout::Position { x: 650.0, y: 40.0 });

    let wire = serde_json::to_value(ModuleEdit::from(&m1)).unwrap();
    assert_eq!(wire["positionX"], 650.0);
    assert_eq!(wire["positionY"], 40.0);
    assert!(wire.get("position").is_none());

    let back: ModuleEdit = serde_json::from_value(wire).unwrap();
    assert_eq!(back.position_x, Some(650.0));
    assert_eq!(back.position_y, Some(40.0));
}

#[test]
fn audit_reports_every_violation() {
    use crate::audit::{audit, AuditFinding};

    // M1 -> GHOST (dangling), M1 -> M2 one-sided (asymmetric).
    let mut m1 = row(1, "M1");
    m1.next_module_codes.insert(ModuleCode::from("GHOST"));
    m1.next_module_codes.insert(ModuleCode::from("M2"));
    let m2 = row(2, "M2");

    let findings = audit(&[m1, m2]);
    assert!(findings.contains(&AuditFinding::Dangling {
        referenced_by: ModuleCode::from("M1"),
        code: ModuleCode::from("GHOST"),
    }));
    assert!(findings.contains(&AuditFinding::Asymmetric {
        from: ModuleCode::from("M1"),
        to: ModuleCode::from("M2"),
    }));
    assert_eq!(findings.len(), 2);
}

#[test]
fn audit_detects_cycles_in_legacy_data() {
    use crate::audit::{audit, AuditFinding};

    let mut m1 = row(1, "M1");
    m1.next_module_codes.insert(ModuleCode::from("M2"));
    m1.prev_module_codes.insert(ModuleCode::from("M2"));
    let mut m2 = row(2, "M2");
    m2.next_module_codes.insert(ModuleCode::from("M1"));
    m2.prev_module_codes.insert(ModuleCode::from("M1"));

    let findings = audit(&[m1, m2]);
    assert!(findings
        .iter()
        .any(|f| matches!(f, AuditFinding::Cycle { .. })));
}

#[test]
fn audit_passes_clean_data() {
    use crate::audit::audit;

    let mut m1 = row(1, "M1");
    m1.next_module_codes.insert(ModuleCode::from("M2"));
    let mut m2 = row(2, "M2");
    m2.prev_module_codes.insert(ModuleCode::from("M1"));

    assert!(audit(&[m1, m2]).is_empty());
}

#[test]
fn diff_engine_assigns_monotonic_sequence() {
    use crate::diff::{DiffEngine, GraphDiff};

    let mut engine = DiffEngine::new();
    let a = engine.stamp(GraphDiff::new("SE-BSC"));
    let b = engine.stamp(GraphDiff::new("SE-BSC"));
    assert_eq!(a.sequence, 1);
    assert_eq!(b.sequence, 2);
    assert!(a.is_empty());
}
