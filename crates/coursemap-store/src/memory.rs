//! In-memory ModuleStore, used by tests and the server's seed path

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use coursemap_core::{CourseGraph, CourseModule, CourseModuleId, EdgeEdit};
use tokio::sync::Mutex;

use crate::{ModuleStore, StoreError};

type CourseRows = HashMap<CourseModuleId, CourseModule>;

/// Map-backed store. Edge edits are applied through a [`CourseGraph`]
/// rebuilt from the stored rows, so the same validation and atomicity rules
/// hold as on the server. Failure injection knobs let tests exercise the
/// persistence-failure paths.
#[derive(Default)]
pub struct MemoryStore {
    courses: Mutex<HashMap<String, CourseRows>>,
    fail_edge_ops: AtomicBool,
    fail_updates_for: Mutex<HashSet<CourseModuleId>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a course with rows, replacing any existing content.
    pub async fn seed(&self, course_code: &str, rows: Vec<CourseModule>) {
        let mut courses = self.courses.lock().await;
        let entry = courses.entry(course_code.to_string()).or_default();
        entry.clear();
        for row in rows {
            entry.insert(row.id, row);
        }
    }

    /// Fetch one stored row, for assertions.
    pub async fn module(&self, course_code: &str, id: CourseModuleId) -> Option<CourseModule> {
        let courses = self.courses.lock().await;
        courses.get(course_code)?.get(&id).cloned()
    }

    /// Make every subsequent edge operation fail with a transport error.
    pub fn fail_edge_ops(&self, fail: bool) {
        self.fail_edge_ops.store(fail, Ordering::SeqCst);
    }

    /// Make `update_module` fail for one specific row id.
    pub async fn fail_updates_for(&self, id: CourseModuleId) {
        self.fail_updates_for.lock().await.insert(id);
    }
}

#[async_trait]
impl ModuleStore for MemoryStore {
    async fn fetch_modules(&self, course_code: &str) -> Result<Vec<CourseModule>, StoreError> {
        let courses = self.courses.lock().await;
        let rows = courses
            .get(course_code)
            .ok_or_else(|| StoreError::UnknownCourse(course_code.to_string()))?;
        let mut out: Vec<CourseModule> = rows.values().cloned().collect();
        out.sort_by_key(|row| row.id);
        Ok(out)
    }

    async fn update_module(
        &self,
        course_code: &str,
        module: &CourseModule,
    ) -> Result<CourseModule, StoreError> {
        if self.fail_updates_for.lock().await.contains(&module.id) {
            return Err(StoreError::Transport("injected update failure".to_string()));
        }
        let mut courses = self.courses.lock().await;
        let rows = courses
            .get_mut(course_code)
            .ok_or_else(|| StoreError::UnknownCourse(course_code.to_string()))?;
        if !rows.contains_key(&module.id) {
            return Err(StoreError::UnknownModule(module.id));
        }
        rows.insert(module.id, module.clone());
        Ok(module.clone())
    }

    async fn apply_edge(
        &self,
        course_code: &str,
        edit: EdgeEdit,
    ) -> Result<Vec<CourseModule>, StoreError> {
        if self.fail_edge_ops.load(Ordering::SeqCst) {
            return Err(StoreError::Transport("injected edge failure".to_string()));
        }
        let mut courses = self.courses.lock().await;
        let rows = courses
            .get_mut(course_code)
            .ok_or_else(|| StoreError::UnknownCourse(course_code.to_string()))?;

        let mut graph = CourseGraph::build(course_code, rows.values().cloned().collect())
            .map_err(|e| StoreError::Rejected(e.to_string()))?;
        let outcome = graph
            .apply_edge_edit(edit)
            .map_err(|e| StoreError::Rejected(e.to_string()))?;

        for row in &outcome.dirty {
            rows.insert(row.id, row.clone());
        }
        Ok(outcome.dirty)
    }

    async fn delete_module(
        &self,
        course_code: &str,
        id: CourseModuleId,
    ) -> Result<(), StoreError> {
        let mut courses = self.courses.lock().await;
        let rows = courses
            .get_mut(course_code)
            .ok_or_else(|| StoreError::UnknownCourse(course_code.to_string()))?;
        rows.remove(&id).ok_or(StoreError::UnknownModule(id))?;
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
