//! Notification service that keeps delivered messages in memory.

use async_trait::async_trait;
use mockable::Clock;
use std::sync::{Arc, RwLock};

use crate::identity::{
    domain::{MentionHandle, User, UserId},
    ports::UserRepository,
};
use crate::notification::{
    domain::{Notification, RelatedEntity},
    ports::{NotificationError, NotificationResult, NotificationService},
};

/// Thread-safe in-memory notification sink.
///
/// Mention handles are resolved against the supplied user repository.
#[derive(Debug)]
pub struct InMemoryNotificationService<U, C> {
    users: Arc<U>,
    clock: Arc<C>,
    delivered: Arc<RwLock<Vec<Notification>>>,
}

impl<U, C> Clone for InMemoryNotificationService<U, C> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            clock: Arc::clone(&self.clock),
            delivered: Arc::clone(&self.delivered),
        }
    }
}

impl<U, C> InMemoryNotificationService<U, C>
where
    U: UserRepository,
    C: Clock + Send + Sync,
{
    /// Creates an empty notification sink.
    #[must_use]
    pub fn new(users: Arc<U>, clock: Arc<C>) -> Self {
        Self {
            users,
            clock,
            delivered: Arc::default(),
        }
    }

    /// Returns every notification delivered so far, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::Persistence`] when the store lock is
    /// poisoned.
    pub fn delivered(&self) -> NotificationResult<Vec<Notification>> {
        let delivered = self.delivered.read().map_err(|err| {
            NotificationError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(delivered.clone())
    }

    /// Returns the notifications delivered to `recipient`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::Persistence`] when the store lock is
    /// poisoned.
    pub fn delivered_to(&self, recipient: UserId) -> NotificationResult<Vec<Notification>> {
        Ok(self
            .delivered()?
            .into_iter()
            .filter(|notification| notification.recipient == recipient)
            .collect())
    }
}

#[async_trait]
impl<U, C> NotificationService for InMemoryNotificationService<U, C>
where
    U: UserRepository,
    C: Clock + Send + Sync,
{
    async fn create_notifications(
        &self,
        recipients: &[UserId],
        message: &str,
        related: RelatedEntity,
    ) -> NotificationResult<()> {
        let now = self.clock.utc();
        let mut seen: Vec<UserId> = Vec::with_capacity(recipients.len());
        for recipient in recipients {
            if !seen.contains(recipient) {
                seen.push(*recipient);
            }
        }
        let mut delivered = self.delivered.write().map_err(|err| {
            NotificationError::persistence(std::io::Error::other(err.to_string()))
        })?;
        delivered.extend(
            seen.into_iter()
                .map(|recipient| Notification::new(recipient, message, related, now)),
        );
        Ok(())
    }

    async fn find_users_by_mentions(
        &self,
        handles: &[MentionHandle],
    ) -> NotificationResult<Vec<UserId>> {
        let users = self.users.find_by_mention_handles(handles).await?;
        Ok(users.iter().map(User::id).collect())
    }
}
