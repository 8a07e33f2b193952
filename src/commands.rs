//! CLI command implementations

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use coursemap_core::{audit, CourseGraph, CourseModule};
use coursemap_server::{CoursemapServer, ServerConfig};
use coursemap_store::{HttpStore, ModuleStore};

pub async fn serve(host: String, port: u16, data: Option<PathBuf>) -> anyhow::Result<()> {
    tracing::info!("Starting coursemap server on {}:{}", host, port);

    let server = CoursemapServer::new(ServerConfig { host, port });
    if let Some(path) = data {
        let state = server.state();
        for (course, rows) in load_courses(&path)? {
            let graph = CourseGraph::build(&course, rows)
                .with_context(|| format!("course {} in {}", course, path.display()))?;
            tracing::info!(
                course = %course,
                modules = graph.module_count(),
                edges = graph.edge_count(),
                "seeded course"
            );
            state.insert_course(graph).await;
        }
    }

    server.start().await
}

pub fn check(file: &Path) -> anyhow::Result<()> {
    let courses = load_courses(file)?;

    let mut total = 0usize;
    for (course, rows) in &courses {
        let findings = audit(rows);
        for finding in &findings {
            println!("{course}: {finding}");
        }
        total += findings.len();
    }

    if total > 0 {
        anyhow::bail!("{total} integrity violation(s) found");
    }
    tracing::info!("no integrity violations in {} course(s)", courses.len());
    Ok(())
}

pub async fn pull(url: &str, course: &str, output: Option<PathBuf>) -> anyhow::Result<()> {
    let mut store = HttpStore::new(url).context("building HTTP client")?;
    if let Ok(token) = std::env::var("COURSEMAP_TOKEN") {
        store = store.with_token(token);
    }

    let rows = store
        .fetch_modules(course)
        .await
        .with_context(|| format!("fetching course {course} from {url}"))?;
    tracing::info!(course = %course, rows = rows.len(), "fetched course");

    let json = serde_json::to_string_pretty(&rows)?;
    match output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("cannot write {}", path.display()))?;
            tracing::info!("wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Read an exported row list and group it by course code.
fn load_courses(path: &Path) -> anyhow::Result<BTreeMap<String, Vec<CourseModule>>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let rows: Vec<CourseModule> = serde_json::from_str(&text)
        .with_context(|| format!("invalid module export {}", path.display()))?;

    let mut courses: BTreeMap<String, Vec<CourseModule>> = BTreeMap::new();
    for row in rows {
        courses.entry(row.course_code.clone()).or_default().push(row);
    }
    Ok(courses)
}
