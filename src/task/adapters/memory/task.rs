//! In-memory task repository for tests and embedded use.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{Task, TaskId, TaskKind, TaskNumber, TaskPredicate},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
///
/// Updates replace the whole aggregate under the write lock.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    number_index: HashMap<TaskNumber, TaskId>,
    sequences: HashMap<(TaskKind, NaiveDate), u32>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        if state.number_index.contains_key(task.number()) {
            return Err(TaskRepositoryError::DuplicateNumber(task.number().clone()));
        }
        state.number_index.insert(task.number().clone(), task.id());
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let Some(stored) = state.tasks.get_mut(&task.id()) else {
            return Err(TaskRepositoryError::NotFound(task.id()));
        };
        *stored = task.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_by_number(&self, number: &TaskNumber) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read()?;
        Ok(state
            .number_index
            .get(number)
            .and_then(|id| state.tasks.get(id))
            .cloned())
    }

    async fn find_matching(&self, predicate: &TaskPredicate) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        let mut matching: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| predicate.matches(task))
            .cloned()
            .collect();
        matching.sort_by(|lhs, rhs| {
            rhs.created_at()
                .cmp(&lhs.created_at())
                .then_with(|| rhs.number().cmp(lhs.number()))
        });
        Ok(matching)
    }

    async fn next_number_sequence(
        &self,
        kind: TaskKind,
        day: NaiveDate,
    ) -> TaskRepositoryResult<u32> {
        let mut state = self.write()?;
        let counter = state.sequences.entry((kind, day)).or_insert(0);
        *counter = counter.saturating_add(1);
        Ok(*counter)
    }
}
