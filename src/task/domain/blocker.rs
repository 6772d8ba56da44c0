//! Blockers recorded against a task.

use super::BlockerId;
use crate::identity::domain::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded impediment preventing progress on a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blocker {
    /// Blocker identifier.
    pub id: BlockerId,
    /// Short reason.
    pub reason: String,
    /// Optional longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Reporting user.
    pub created_by: UserId,
    /// Report time.
    pub created_at: DateTime<Utc>,
    /// Whether the impediment has been cleared.
    #[serde(default)]
    pub resolved: bool,
    /// Resolving user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<UserId>,
    /// Resolution time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Blocker {
    pub(super) const fn resolve(&mut self, by: UserId, at: DateTime<Utc>) {
        self.resolved = true;
        self.resolved_by = Some(by);
        self.resolved_at = Some(at);
    }
}
