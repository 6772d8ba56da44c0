//! Diesel row models for task persistence.

use super::schema::tasks;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Insert and update model for task records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Aggregate kind.
    pub kind: String,
    /// Unique human-readable number.
    pub number: String,
    /// Workflow status.
    pub status: String,
    /// Creating user.
    pub created_by: uuid::Uuid,
    /// Assigned users.
    pub assigned_to: Vec<uuid::Uuid>,
    /// Parent ticket.
    pub ticket_id: Option<uuid::Uuid>,
    /// Parent task.
    pub parent_task_id: Option<uuid::Uuid>,
    /// Due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Estimated effort in hours.
    pub estimated_hours: Option<f64>,
    /// Serialized aggregate.
    pub document: Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
