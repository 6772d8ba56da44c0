//! Guard deciding whether a user may act on a task.

use super::TaskServiceResult;
use crate::identity::domain::{Actor, Role, UserId};
use crate::task::{
    domain::{TaskId, has_access},
    ports::TaskRepository,
};
use std::sync::Arc;

/// Task access guard shared by tasks and test tasks.
#[derive(Debug)]
pub struct TaskAccessGuard<R> {
    tasks: Arc<R>,
}

impl<R> Clone for TaskAccessGuard<R> {
    fn clone(&self) -> Self {
        Self {
            tasks: Arc::clone(&self.tasks),
        }
    }
}

impl<R: TaskRepository> TaskAccessGuard<R> {
    /// Creates a guard over the task repository.
    #[must_use]
    pub const fn new(tasks: Arc<R>) -> Self {
        Self { tasks }
    }

    /// Returns `true` when the user is an admin, the task's creator or one
    /// of its assignees.
    ///
    /// A missing task yields `false` rather than an error.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when the task cannot be loaded.
    pub async fn has_access(
        &self,
        user: UserId,
        role: Role,
        task_id: TaskId,
    ) -> TaskServiceResult<bool> {
        let actor = Actor::new(user, role);
        Ok(self
            .tasks
            .find_by_id(task_id)
            .await?
            .is_some_and(|task| has_access(&actor, &task)))
    }
}
