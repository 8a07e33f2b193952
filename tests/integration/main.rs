//! Integration tests for coursemap
//!
//! These tests verify that the crates work together correctly.

use std::sync::Arc;

use coursemap_core::{audit, CourseGraph, CourseModule, CourseModuleId, ModuleCode};
use coursemap_store::{MemoryStore, PersistOutcome, SyncSession};

fn row(id: i64, code: &str) -> CourseModule {
    CourseModule::new(CourseModuleId(id), "SE-BSC", ModuleCode::from(code))
}

/// Test that the CLI can be invoked
#[test]
fn test_cli_invocation() {
    let output = std::process::Command::new("cargo")
        .args(["run", "--", "--help"])
        .current_dir(".")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("coursemap"));
    assert!(stdout.contains("prerequisite graph"));
}

/// Test that the server can be constructed with a seeded course
#[tokio::test]
async fn test_server_startup() {
    use coursemap_server::{CoursemapServer, ServerConfig};

    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0, // Let OS assign port
    };
    let server = CoursemapServer::new(config);

    let graph = CourseGraph::build("SE-BSC", vec![row(1, "M1"), row(2, "M2")]).unwrap();
    server.state().insert_course(graph).await;

    let state = server.state();
    let catalog = state.catalog.read().await;
    assert_eq!(catalog.get("SE-BSC").unwrap().graph.module_count(), 2);
}

/// Test a full edit session against a store: connect, verify both sides
/// persisted, disconnect, verify the pre-edit state is restored
#[tokio::test]
async fn test_end_to_end_edit_flow() {
    let store = Arc::new(MemoryStore::new());
    store
        .seed("SE-BSC", vec![row(1, "M1"), row(2, "M2"), row(3, "M3")])
        .await;

    let mut session = SyncSession::load(store.clone(), "SE-BSC").await.unwrap();
    let outcome = session
        .connect(CourseModuleId(1), CourseModuleId(2))
        .await
        .unwrap();
    assert!(matches!(outcome, PersistOutcome::Committed { .. }));

    // A fresh session sees the committed edge.
    let reloaded = SyncSession::load(store.clone(), "SE-BSC").await.unwrap();
    assert!(reloaded
        .graph()
        .contains_edge(CourseModuleId(1), CourseModuleId(2)));

    let outcome = session
        .disconnect(CourseModuleId(1), CourseModuleId(2))
        .await
        .unwrap();
    assert!(matches!(outcome, PersistOutcome::Committed { .. }));

    let reloaded = SyncSession::load(store, "SE-BSC").await.unwrap();
    assert_eq!(reloaded.graph().edge_count(), 0);
}

/// Test that a graph snapshot survives an export/audit round trip
#[test]
fn test_export_audit_round_trip() {
    let mut graph =
        CourseGraph::build("SE-BSC", vec![row(1, "M1"), row(2, "M2"), row(3, "M3")]).unwrap();
    graph.add_edge(CourseModuleId(1), CourseModuleId(2)).unwrap();
    graph.add_edge(CourseModuleId(2), CourseModuleId(3)).unwrap();

    let json = serde_json::to_string(&graph.snapshot()).unwrap();
    let rows: Vec<CourseModule> = serde_json::from_str(&json).unwrap();
    assert!(audit(&rows).is_empty());

    let rebuilt = CourseGraph::build("SE-BSC", rows).unwrap();
    assert_eq!(rebuilt.edge_count(), 2);
}

/// Test that the editor-facing render endpoint data stays consistent with
/// the row snapshot
#[tokio::test]
async fn test_render_matches_snapshot() {
    let mut graph = CourseGraph::build("SE-BSC", vec![row(1, "M1"), row(2, "M2")]).unwrap();
    graph.add_edge(CourseModuleId(1), CourseModuleId(2)).unwrap();
    graph.move_node(CourseModuleId(2), 650.0, 40.0).unwrap();

    let (nodes, edges) = graph.render();
    assert_eq!(nodes.len(), graph.module_count());
    assert_eq!(edges.len(), graph.edge_count());

    let n2 = nodes.iter().find(|n| n.id == CourseModuleId(2)).unwrap();
    assert_eq!(n2.tier, 3);
}
