//! Repository port for task persistence and scoped lookup.

use crate::task::domain::{Task, TaskId, TaskKind, TaskNumber, TaskPredicate};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Each call to [`TaskRepository::update`] replaces the whole aggregate in
/// one write, so a status flip and its history entries land together.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the identifier
    /// exists or [`TaskRepositoryError::DuplicateNumber`] when the number is
    /// taken.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Replaces an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn update(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Finds a task by internal identifier.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Finds a task by its human-readable number.
    async fn find_by_number(&self, number: &TaskNumber) -> TaskRepositoryResult<Option<Task>>;

    /// Returns the tasks matching `predicate`, newest first.
    async fn find_matching(&self, predicate: &TaskPredicate) -> TaskRepositoryResult<Vec<Task>>;

    /// Allocates the next number sequence for `kind` on `day`, starting at 1.
    async fn next_number_sequence(&self, kind: TaskKind, day: NaiveDate)
    -> TaskRepositoryResult<u32>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// A task with the same number already exists.
    #[error("duplicate task number: {0}")]
    DuplicateNumber(TaskNumber),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
