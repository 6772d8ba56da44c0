//! Append-only audit log entries recorded on every task mutation.

use super::{BlockerId, CommentId, TaskId, TaskNumber, TaskStatus};
use crate::identity::domain::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Action discriminator of a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HistoryAction {
    /// The task was created.
    Created,
    /// Non-status fields changed.
    Updated,
    /// The status changed.
    StatusChanged,
    /// Users were assigned.
    Assigned,
    /// A blocker was added.
    Blocked,
    /// The last open blocker was resolved.
    Unblocked,
    /// A comment was added.
    Commented,
    /// A test result was recorded.
    Tested,
}

impl HistoryAction {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::StatusChanged => "statusChanged",
            Self::Assigned => "assigned",
            Self::Blocked => "blocked",
            Self::Unblocked => "unblocked",
            Self::Commented => "commented",
            Self::Tested => "tested",
        }
    }
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action-specific payload of a history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum HistoryDetails {
    /// Task creation.
    Created {
        /// Allocated number.
        number: TaskNumber,
    },
    /// Field update.
    Updated {
        /// Names of the changed fields.
        fields: Vec<String>,
    },
    /// Status transition.
    StatusChanged {
        /// Status before the change.
        previous_status: TaskStatus,
        /// Status after the change.
        new_status: TaskStatus,
        /// Free-text explanation, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        /// Whether the change moved the task out of a terminal status.
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        reopened: bool,
    },
    /// Assignment.
    Assigned {
        /// Newly assigned users.
        users: Vec<UserId>,
    },
    /// Blocker added.
    Blocked {
        /// Blocked task.
        task_id: TaskId,
        /// Added blocker.
        blocker_id: BlockerId,
        /// Blocker reason.
        reason: String,
    },
    /// Last open blocker resolved.
    Unblocked {
        /// Unblocked task.
        task_id: TaskId,
        /// Resolved blocker.
        blocker_id: BlockerId,
        /// Status restored on unblocking.
        restored_status: TaskStatus,
    },
    /// Comment added.
    Commented {
        /// Added comment.
        comment_id: CommentId,
    },
    /// Test result recorded.
    Tested {
        /// Whether verification passed.
        passed: bool,
        /// Tester notes.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        notes: Option<String>,
    },
}

impl HistoryDetails {
    /// Returns the action discriminator.
    #[must_use]
    pub const fn action(&self) -> HistoryAction {
        match self {
            Self::Created { .. } => HistoryAction::Created,
            Self::Updated { .. } => HistoryAction::Updated,
            Self::StatusChanged { .. } => HistoryAction::StatusChanged,
            Self::Assigned { .. } => HistoryAction::Assigned,
            Self::Blocked { .. } => HistoryAction::Blocked,
            Self::Unblocked { .. } => HistoryAction::Unblocked,
            Self::Commented { .. } => HistoryAction::Commented,
            Self::Tested { .. } => HistoryAction::Tested,
        }
    }
}

/// Who performed a recorded action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum PerformedBy {
    /// A user acting through the workflow services.
    User(UserId),
    /// The background sweeper.
    System,
}

impl PerformedBy {
    /// Returns the acting user, if any.
    #[must_use]
    pub const fn user(self) -> Option<UserId> {
        match self {
            Self::User(id) => Some(id),
            Self::System => None,
        }
    }
}

/// One immutable audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Actor of the change.
    pub performed_by: PerformedBy,
    /// Commit time of the change.
    pub timestamp: DateTime<Utc>,
    /// Action payload.
    pub details: HistoryDetails,
}

impl HistoryEntry {
    /// Returns the action discriminator.
    #[must_use]
    pub const fn action(&self) -> HistoryAction {
        self.details.action()
    }

    /// Returns `true` when this entry moved the task into `status`.
    #[must_use]
    pub fn entered(&self, status: TaskStatus) -> bool {
        matches!(
            self.details,
            HistoryDetails::StatusChanged { new_status, .. } if new_status == status
        )
    }
}
