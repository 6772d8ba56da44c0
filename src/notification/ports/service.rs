//! Notification collaborator consumed by the task workflow.
//!
//! Implementations only need to persist or deliver messages and resolve
//! mention handles; mention scanning and message rendering are provided by
//! the default methods so every adapter formats messages identically.

use crate::identity::domain::{MentionHandle, UserId};
use crate::identity::ports::UserRepositoryError;
use crate::notification::domain::{
    NotificationTemplate, RelatedEntity, TemplateRenderError, scan_mention_tokens,
};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Result type for notification operations.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// Notification delivery contract.
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Creates one notification per recipient carrying `message`.
    ///
    /// Duplicate recipients receive a single notification.
    async fn create_notifications(
        &self,
        recipients: &[UserId],
        message: &str,
        related: RelatedEntity,
    ) -> NotificationResult<()>;

    /// Resolves mention handles to the identifiers of their owners.
    ///
    /// Unknown handles are ignored.
    async fn find_users_by_mentions(
        &self,
        handles: &[MentionHandle],
    ) -> NotificationResult<Vec<UserId>>;

    /// Tells `recipient` they were assigned to a task.
    async fn notify_task_assignment(
        &self,
        recipient: UserId,
        task_id: Uuid,
        task_name: &str,
        assigner_name: &str,
    ) -> NotificationResult<()> {
        let message = NotificationTemplate::Assignment.render(json!({
            "assigner": assigner_name,
            "task_name": task_name,
        }))?;
        self.create_notifications(&[recipient], &message, RelatedEntity::task(task_id))
            .await
    }

    /// Scans `text` for `@handle` tokens and resolves them to users.
    async fn extract_mentions(&self, text: &str) -> NotificationResult<Vec<UserId>> {
        let handles = scan_mention_tokens(text);
        if handles.is_empty() {
            return Ok(Vec::new());
        }
        self.find_users_by_mentions(&handles).await
    }

    /// Notifies every user mentioned in `text` and returns their identifiers.
    async fn process_mentions(
        &self,
        text: &str,
        author_name: &str,
        related: RelatedEntity,
    ) -> NotificationResult<Vec<UserId>> {
        let mentioned = self.extract_mentions(text).await?;
        if mentioned.is_empty() {
            return Ok(mentioned);
        }
        let message = NotificationTemplate::Mention.render(json!({
            "author": author_name,
            "entity_type": related.kind.as_str().to_lowercase(),
        }))?;
        self.create_notifications(&mentioned, &message, related)
            .await?;
        Ok(mentioned)
    }
}

/// Errors returned by notification implementations.
#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    /// A message template failed to render.
    #[error(transparent)]
    Template(#[from] TemplateRenderError),

    /// Resolving mentioned users failed.
    #[error("user lookup failed: {0}")]
    Directory(#[from] UserRepositoryError),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotificationError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
