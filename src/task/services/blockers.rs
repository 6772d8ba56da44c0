//! Blocker operations on the task workflow.

use super::{TaskServiceResult, TaskWorkflowService};
use crate::identity::{domain::Actor, ports::UserRepository};
use crate::notification::ports::NotificationService;
use crate::task::{
    domain::{Blocker, BlockerId, Task, TaskId, TaskStatus},
    ports::TaskRepository,
};
use crate::ticket::ports::TicketRepository;
use mockable::Clock;
use tracing::{info, instrument};

impl<R, U, T, N, C> TaskWorkflowService<R, U, T, N, C>
where
    R: TaskRepository,
    U: UserRepository,
    T: TicketRepository,
    N: NotificationService,
    C: Clock + Send + Sync,
{
    /// Records a blocker and forces the task into `Blocked`.
    ///
    /// The status flip, the blocker and its history entries are saved in a
    /// single write.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskServiceError::NotFound`] for an unknown task,
    /// [`super::TaskServiceError::Authorization`], or
    /// [`super::TaskServiceError::Validation`] for a blank reason.
    #[instrument(skip(self, reason, description), fields(actor = %actor.id()))]
    pub async fn add_blocker(
        &self,
        actor: &Actor,
        id: TaskId,
        reason: &str,
        description: Option<String>,
    ) -> TaskServiceResult<Blocker> {
        let mut task = self.load(id).await?;
        Self::authorize(actor, &task, "block this task")?;
        Self::ensure_may_leave(actor, &task, TaskStatus::Blocked)?;
        let added = task.add_blocker(reason, description, actor.id(), &*self.clock)?;
        self.tasks.update(&task).await?;
        info!(task_id = %id, blocker_id = %added.blocker.id, "blocker added");
        if let Some(transition) = added.transition {
            let reason = added.blocker.reason.as_str();
            self.after_transition(&task, transition, actor, Some(reason))
                .await;
        }
        Ok(added.blocker)
    }

    /// Resolves a blocker, restoring the pre-block status once no open
    /// blocker remains.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskServiceError::NotFound`] for an unknown task or
    /// blocker, [`super::TaskServiceError::Authorization`], or
    /// [`super::TaskServiceError::Validation`] for an already resolved
    /// blocker.
    #[instrument(skip(self), fields(actor = %actor.id()))]
    pub async fn resolve_blocker(
        &self,
        actor: &Actor,
        id: TaskId,
        blocker_id: BlockerId,
    ) -> TaskServiceResult<Task> {
        let mut task = self.load(id).await?;
        Self::authorize(actor, &task, "resolve blockers on this task")?;
        let resolved = task.resolve_blocker(blocker_id, actor.id(), &*self.clock)?;
        self.tasks.update(&task).await?;
        info!(task_id = %id, blocker_id = %blocker_id, "blocker resolved");
        if let Some(transition) = resolved.transition {
            self.after_transition(&task, transition, actor, Some("all blockers resolved"))
                .await;
        }
        Ok(task)
    }
}
