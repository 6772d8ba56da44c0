//! `PostgreSQL`-backed notification service.

use super::{models::NewNotificationRow, schema::notifications};
use crate::identity::{
    adapters::postgres::schema::users,
    domain::{MentionHandle, UserId},
};
use crate::notification::{
    domain::{Notification, RelatedEntity},
    ports::{NotificationError, NotificationResult, NotificationService},
};
use crate::persistence::{BlockingError, DEFAULT_REQUEST_TIMEOUT, PgPool, run_blocking};
use async_trait::async_trait;
use diesel::prelude::*;
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;

/// Notification service writing to the `notifications` table.
#[derive(Debug)]
pub struct PostgresNotificationService<C> {
    pool: PgPool,
    clock: Arc<C>,
    timeout: Duration,
}

impl<C> Clone for PostgresNotificationService<C> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            clock: Arc::clone(&self.clock),
            timeout: self.timeout,
        }
    }
}

impl<C> PostgresNotificationService<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a service from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool, clock: Arc<C>) -> Self {
        Self {
            pool,
            clock,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Overrides the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl From<BlockingError> for NotificationError {
    fn from(err: BlockingError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl<C> NotificationService for PostgresNotificationService<C>
where
    C: Clock + Send + Sync,
{
    async fn create_notifications(
        &self,
        recipients: &[UserId],
        message: &str,
        related: RelatedEntity,
    ) -> NotificationResult<()> {
        let now = self.clock.utc();
        let mut rows: Vec<NewNotificationRow> = Vec::with_capacity(recipients.len());
        for recipient in recipients {
            if rows
                .iter()
                .any(|row| row.recipient == recipient.into_inner())
            {
                continue;
            }
            rows.push(to_row(&Notification::new(*recipient, message, related, now)));
        }
        if rows.is_empty() {
            return Ok(());
        }
        run_blocking(&self.pool, self.timeout, move |connection| {
            diesel::insert_into(notifications::table)
                .values(&rows)
                .execute(connection)
                .map_err(NotificationError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn find_users_by_mentions(
        &self,
        handles: &[MentionHandle],
    ) -> NotificationResult<Vec<UserId>> {
        let raw_handles: Vec<String> = handles
            .iter()
            .map(|handle| handle.as_str().to_owned())
            .collect();
        run_blocking(&self.pool, self.timeout, move |connection| {
            let ids = users::table
                .filter(users::mention_handle.eq_any(raw_handles))
                .select(users::id)
                .load::<uuid::Uuid>(connection)
                .map_err(NotificationError::persistence)?;
            Ok(ids.into_iter().map(UserId::from_uuid).collect())
        })
        .await
    }
}

fn to_row(notification: &Notification) -> NewNotificationRow {
    NewNotificationRow {
        id: notification.id.into_inner(),
        recipient: notification.recipient.into_inner(),
        message: notification.message.clone(),
        related_entity_id: notification.related.id,
        related_entity_type: notification.related.kind.as_str().to_owned(),
        read: notification.read,
        created_at: notification.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::domain::RelatedEntityType;
    use chrono::Utc;

    #[test]
    fn row_carries_related_entity_kind() {
        let task_id = uuid::Uuid::new_v4();
        let notification = Notification::new(
            UserId::new(),
            "Ada assigned you to task: Fix login",
            RelatedEntity::task(task_id),
            Utc::now(),
        );

        let row = to_row(&notification);

        assert_eq!(row.related_entity_id, task_id);
        assert_eq!(row.related_entity_type, RelatedEntityType::Task.as_str());
        assert!(!row.read);
    }
}
