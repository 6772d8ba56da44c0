//! Error types for task domain validation and parsing.

use super::{BlockerId, TaskId, TaskStatus};
use thiserror::Error;

/// Errors returned while constructing or mutating task aggregates.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TaskDomainError {
    /// The task name is empty after trimming.
    #[error("task name must not be empty")]
    EmptyName,

    /// The task description is empty after trimming.
    #[error("task description must not be empty")]
    EmptyDescription,

    /// Estimated hours must be a finite, non-negative number.
    #[error("invalid estimated hours {0}, expected a non-negative number")]
    InvalidEstimate(f64),

    /// Priority outside the accepted range.
    #[error("invalid priority {0}, expected 1 to 5")]
    InvalidPriority(u8),

    /// A blocker needs a reason.
    #[error("blocker reason must not be empty")]
    EmptyBlockerReason,

    /// No blocker with the identifier exists on the task.
    #[error("blocker {blocker_id} not found on task {task_id}")]
    BlockerNotFound {
        /// Task searched.
        task_id: TaskId,
        /// Missing blocker.
        blocker_id: BlockerId,
    },

    /// The blocker has already been resolved.
    #[error("blocker {0} is already resolved")]
    BlockerAlreadyResolved(BlockerId),

    /// Comment text is empty after trimming.
    #[error("comment text must not be empty")]
    EmptyComment,

    /// Attachment name or storage reference is empty.
    #[error("attachment name and storage reference must not be empty")]
    EmptyAttachment,

    /// Test results can only be recorded while the task is in testing.
    #[error("task {task_id} is {status}, test results require Testing")]
    NotInTesting {
        /// Task concerned.
        task_id: TaskId,
        /// Current status.
        status: TaskStatus,
    },

    /// The requested parent cannot hold subtasks.
    #[error("task {0} cannot be used as a parent task")]
    InvalidParent(TaskId),

    /// Stored status string is not recognised.
    #[error("unknown task status: {0}")]
    UnknownStatus(String),

    /// Stored kind string is not recognised.
    #[error("unknown task kind: {0}")]
    UnknownKind(String),

    /// Stored number does not follow `PREFIX-YYYYMMDD-NNNN`.
    #[error("invalid task number: {0}")]
    InvalidTaskNumber(String),
}
