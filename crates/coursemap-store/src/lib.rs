//! Coursemap Store — remote persistence for course graphs
//!
//! A [`ModuleStore`] is the remote half of the synchronization layer. The
//! edge operation is deliberately a single call carrying both endpoint ids,
//! so the backing store can apply the two row updates transactionally
//! instead of racing two independent writes.

pub mod http;
pub mod memory;
pub mod sync;


use async_trait::async_trait;
use coursemap_core::{CourseModule, CourseModuleId, EdgeEdit};

pub use http::HttpStore;
pub use memory::MemoryStore;
pub use sync::{PersistOutcome, SyncError, SyncSession};

/// Failures talking to a remote store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("course {0} not found in store")]
    UnknownCourse(String),

    #[error("course module {0} not found in store")]
    UnknownModule(CourseModuleId),

    #[error("edit rejected by store: {0}")]
    Rejected(String),

    #[error("transport failure: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Transport(err.to_string())
    }
}

/// Remote persistence backend for course-module rows.
#[async_trait]
pub trait ModuleStore: Send + Sync {
    /// Fetch every course-module row of a course.
    async fn fetch_modules(&self, course_code: &str) -> Result<Vec<CourseModule>, StoreError>;

    /// Persist one full row; returns the stored row.
    async fn update_module(
        &self,
        course_code: &str,
        module: &CourseModule,
    ) -> Result<CourseModule, StoreError>;

    /// Apply one logical edge edit. Both endpoint rows are carried in a
    /// single request and committed together or not at all; returns the
    /// updated rows.
    async fn apply_edge(
        &self,
        course_code: &str,
        edit: EdgeEdit,
    ) -> Result<Vec<CourseModule>, StoreError>;

    /// Delete one row.
    async fn delete_module(
        &self,
        course_code: &str,
        id: CourseModuleId,
    ) -> Result<(), StoreError>;

    /// Backend name, for logging.
    fn name(&self) -> &str;
}
