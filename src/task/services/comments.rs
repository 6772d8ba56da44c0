//! Comment and mention pipeline on the task workflow.

use super::{AddCommentRequest, TaskServiceResult, TaskView, TaskWorkflowService, UploadedFile};
use crate::identity::{
    domain::{Actor, User, UserId},
    ports::UserRepository,
};
use crate::notification::{
    domain::{NotificationTemplate, RelatedEntity},
    ports::NotificationService,
};
use crate::task::{
    domain::{CommentId, Task, TaskDomainError, TaskId},
    ports::TaskRepository,
};
use crate::ticket::ports::TicketRepository;
use mockable::Clock;
use serde_json::json;
use std::collections::BTreeSet;
use tracing::{info, instrument, warn};

impl<R, U, T, N, C> TaskWorkflowService<R, U, T, N, C>
where
    R: TaskRepository,
    U: UserRepository,
    T: TicketRepository,
    N: NotificationService,
    C: Clock + Send + Sync,
{
    /// Adds a comment and notifies every newly mentioned user once.
    ///
    /// Mentions come from `@handle` tokens in the text and from the
    /// request's explicit list; a user named by both is recorded and
    /// notified once. The returned view is reloaded from the repository.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskServiceError::NotFound`],
    /// [`super::TaskServiceError::Authorization`] when the author is neither
    /// privileged nor the task's creator or assignee, or
    /// [`super::TaskServiceError::Validation`] for blank text.
    #[instrument(skip(self, request), fields(actor = %actor.id()))]
    pub async fn add_comment(
        &self,
        actor: &Actor,
        id: TaskId,
        request: AddCommentRequest,
    ) -> TaskServiceResult<TaskView> {
        let mut task = self.load(id).await?;
        Self::authorize(actor, &task, "comment on this task")?;
        if request.text.trim().is_empty() {
            return Err(TaskDomainError::EmptyComment.into());
        }
        let inline = self.resolve_mentions(&request.text).await;
        let explicit = self.known_users(&request.mentions).await?;
        let files = request
            .files
            .into_iter()
            .map(UploadedFile::into_descriptor)
            .collect();
        let added = task.add_comment(
            &request.text,
            actor.id(),
            files,
            inline.into_iter().chain(explicit),
            &*self.clock,
        )?;
        self.tasks.update(&task).await?;
        info!(
            task_id = %id,
            comment_id = %added.comment_id,
            mentioned = added.mentioned.len(),
            "comment added"
        );
        if !added.mentioned.is_empty() {
            self.notify_comment_mentions(&mut task, added.comment_id, &added.mentioned, actor)
                .await;
        }
        let reloaded = self.load(id).await?;
        TaskView::resolve(reloaded, &*self.users).await
    }

    async fn known_users(&self, requested: &[UserId]) -> TaskServiceResult<Vec<UserId>> {
        if requested.is_empty() {
            return Ok(Vec::new());
        }
        let known: BTreeSet<UserId> = self
            .users
            .find_by_ids(requested)
            .await?
            .iter()
            .map(User::id)
            .collect();
        let (kept, dropped): (Vec<UserId>, Vec<UserId>) =
            requested.iter().partition(|user| known.contains(user));
        if !dropped.is_empty() {
            warn!(?dropped, "ignoring mentions of unknown users");
        }
        Ok(kept)
    }

    async fn notify_comment_mentions(
        &self,
        task: &mut Task,
        comment_id: CommentId,
        mentioned: &[UserId],
        author: &Actor,
    ) {
        let author_name = self.display_name(author.id()).await;
        let message = match NotificationTemplate::CommentMention.render(json!({
            "author": author_name,
            "task_name": task.name(),
        })) {
            Ok(text) => text,
            Err(err) => {
                warn!(task_id = %task.id(), error = %err, "mention message rendering failed");
                return;
            }
        };
        let related = RelatedEntity::task(task.id().into_inner());
        if let Err(err) = self
            .notifications
            .create_notifications(mentioned, &message, related)
            .await
        {
            warn!(task_id = %task.id(), error = %err, "mention notification failed");
            return;
        }
        task.mark_comment_mentions_notified(comment_id, mentioned);
        if let Err(err) = self.tasks.update(task).await {
            warn!(task_id = %task.id(), error = %err, "failed to record notified mentions");
        }
    }
}
