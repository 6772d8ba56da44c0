//! Diesel row models for notification persistence.

use super::schema::notifications;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Insert row for a notification.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewNotificationRow {
    /// Notification identifier.
    pub id: uuid::Uuid,
    /// Receiving user.
    pub recipient: uuid::Uuid,
    /// Rendered message.
    pub message: String,
    /// Related entity identifier.
    pub related_entity_id: uuid::Uuid,
    /// Related entity kind.
    pub related_entity_type: String,
    /// Read flag.
    pub read: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
