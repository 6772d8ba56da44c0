//! Diesel row models for user persistence.

use super::schema::users;
use diesel::prelude::*;

/// Query result row for user records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// Internal user identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub display_name: String,
    /// Mention handle without the `@` prefix.
    pub mention_handle: String,
    /// Role in canonical string form.
    pub role: String,
    /// Managing project manager.
    pub project_manager: Option<uuid::Uuid>,
    /// Managing group leader.
    pub group_leader: Option<uuid::Uuid>,
    /// Managing responsible tester.
    pub responsible_tester: Option<uuid::Uuid>,
}
