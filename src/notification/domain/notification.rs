//! Notification records and the entities they point at.

use crate::identity::domain::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a stored notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(Uuid);

impl NotificationId {
    /// Creates a new random notification identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a notification identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

/// Kind of entity a notification refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelatedEntityType {
    /// A task or test task.
    Task,
    /// A client ticket.
    Ticket,
    /// A user account.
    User,
}

impl RelatedEntityType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Task => "Task",
            Self::Ticket => "Ticket",
            Self::User => "User",
        }
    }
}

impl fmt::Display for RelatedEntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to the entity a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelatedEntity {
    /// Identifier of the related entity.
    pub id: Uuid,
    /// Kind of the related entity.
    pub kind: RelatedEntityType,
}

impl RelatedEntity {
    /// Creates a reference to a task.
    #[must_use]
    pub const fn task(id: Uuid) -> Self {
        Self {
            id,
            kind: RelatedEntityType::Task,
        }
    }

    /// Creates a reference to a ticket.
    #[must_use]
    pub const fn ticket(id: Uuid) -> Self {
        Self {
            id,
            kind: RelatedEntityType::Ticket,
        }
    }
}

/// One message delivered to one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Notification identifier.
    pub id: NotificationId,
    /// Receiving user.
    pub recipient: UserId,
    /// Rendered message text.
    pub message: String,
    /// Entity the message is about.
    pub related: RelatedEntity,
    /// Whether the recipient has read it.
    pub read: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Creates an unread notification.
    #[must_use]
    pub fn new(
        recipient: UserId,
        message: impl Into<String>,
        related: RelatedEntity,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            recipient,
            message: message.into(),
            related,
            read: false,
            created_at,
        }
    }
}
