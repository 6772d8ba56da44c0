//! Diesel row models for ticket persistence.

use super::schema::tickets;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Row model for ticket records, used for both reads and writes.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = tickets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TicketRow {
    /// Internal ticket identifier.
    pub id: uuid::Uuid,
    /// Ticket title.
    pub title: String,
    /// Description text.
    pub description: String,
    /// Lifecycle status.
    pub status: String,
    /// Billing status.
    pub financial_status: String,
    /// Creating user.
    pub created_by: uuid::Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
