//! Fan-out of status change notifications.

use super::TaskServiceResult;
use crate::identity::{
    domain::{Role, User, UserId},
    ports::UserRepository,
};
use crate::notification::{
    domain::{NotificationTemplate, RelatedEntity},
    ports::{NotificationError, NotificationService},
};
use crate::task::domain::{PerformedBy, StatusTransition, Task};
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Notifies assignees and admins whenever a task changes status.
///
/// Shared by the workflow services and the expiry sweeper so both produce
/// identical messages.
#[derive(Debug)]
pub struct StatusNotifier<U, N> {
    users: Arc<U>,
    notifications: Arc<N>,
}

impl<U, N> Clone for StatusNotifier<U, N> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            notifications: Arc::clone(&self.notifications),
        }
    }
}

impl<U, N> StatusNotifier<U, N>
where
    U: UserRepository,
    N: NotificationService,
{
    /// Creates a notifier.
    #[must_use]
    pub const fn new(users: Arc<U>, notifications: Arc<N>) -> Self {
        Self {
            users,
            notifications,
        }
    }

    /// Sends the status change notification.
    ///
    /// Recipients are the task's assignees plus every admin, each notified
    /// once.
    ///
    /// # Errors
    ///
    /// Returns an error when the recipients cannot be resolved or the
    /// notification cannot be delivered.
    pub async fn notify(
        &self,
        task: &Task,
        transition: StatusTransition,
        performed_by: PerformedBy,
        reason: Option<&str>,
    ) -> TaskServiceResult<()> {
        let admins = self.users.find_by_role(Role::Admin).await?;
        let recipients: BTreeSet<UserId> = task
            .assigned_to()
            .iter()
            .copied()
            .chain(admins.iter().map(User::id))
            .collect();
        if recipients.is_empty() {
            debug!(task_id = %task.id(), "no recipients for status change");
            return Ok(());
        }
        let actor_name = match performed_by.user() {
            Some(user) => self
                .users
                .find_by_id(user)
                .await?
                .map(|found| found.display_name().to_owned()),
            None => None,
        };
        let message = NotificationTemplate::StatusChanged
            .render(json!({
                "task_name": task.name(),
                "number": task.number().as_str(),
                "previous_status": transition.previous.as_str(),
                "new_status": transition.current.as_str(),
                "actor": actor_name,
                "reason": reason,
            }))
            .map_err(NotificationError::from)?;
        let recipient_list: Vec<UserId> = recipients.into_iter().collect();
        self.notifications
            .create_notifications(
                &recipient_list,
                &message,
                RelatedEntity::task(task.id().into_inner()),
            )
            .await?;
        Ok(())
    }

    /// Sends the status change notification, logging instead of failing.
    ///
    /// The change has already been persisted when this runs, so a delivery
    /// failure must not be reported as a failed mutation.
    pub async fn announce(
        &self,
        task: &Task,
        transition: StatusTransition,
        performed_by: PerformedBy,
        reason: Option<&str>,
    ) {
        if let Err(err) = self.notify(task, transition, performed_by, reason).await {
            warn!(
                task_id = %task.id(),
                number = %task.number(),
                status = %transition.current,
                error = %err,
                "status change notification failed"
            );
        }
    }
}
