//! Error taxonomy surfaced by the task services.

use crate::identity::domain::{Role, UserId};
use crate::identity::ports::UserRepositoryError;
use crate::notification::ports::NotificationError;
use crate::task::domain::{TaskDomainError, TaskId, TaskNumber};
use crate::task::ports::TaskRepositoryError;
use crate::ticket::domain::TicketId;
use crate::ticket::ports::TicketRepositoryError;
use std::fmt;
use thiserror::Error;

/// Coarse classification a presentation layer maps to user-facing
/// responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A referenced record does not exist.
    NotFound,
    /// The input was rejected.
    Validation,
    /// The actor may not perform the operation.
    Authorization,
    /// The store failed.
    Persistence,
    /// The notification collaborator failed.
    Notification,
}

/// A record that could not be found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingEntity {
    /// Task or test task.
    Task(TaskId),
    /// Task or test task looked up by number.
    Number(TaskNumber),
    /// Ticket.
    Ticket(TicketId),
    /// User.
    User(UserId),
}

impl fmt::Display for MissingEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Task(id) => write!(f, "task {id}"),
            Self::Number(number) => write!(f, "task {number}"),
            Self::Ticket(id) => write!(f, "ticket {id}"),
            Self::User(id) => write!(f, "user {id}"),
        }
    }
}

/// Service-level errors for task operations.
#[derive(Debug, Error)]
pub enum TaskServiceError {
    /// A referenced record does not exist.
    #[error("{0} not found")]
    NotFound(MissingEntity),

    /// Domain validation failed.
    #[error(transparent)]
    Validation(#[from] TaskDomainError),

    /// The actor's role, ownership or assignment does not permit the
    /// operation.
    #[error("{role} may not {operation}")]
    Authorization {
        /// Acting role.
        role: Role,
        /// Attempted operation.
        operation: &'static str,
    },

    /// Task repository failure.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),

    /// User repository failure.
    #[error(transparent)]
    Users(#[from] UserRepositoryError),

    /// Ticket repository failure.
    #[error(transparent)]
    Tickets(#[from] TicketRepositoryError),

    /// Notification collaborator failure.
    #[error(transparent)]
    Notification(#[from] NotificationError),
}

impl TaskServiceError {
    /// Returns the coarse error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_)
            | Self::Repository(TaskRepositoryError::NotFound(_))
            | Self::Tickets(TicketRepositoryError::NotFound(_))
            | Self::Validation(TaskDomainError::BlockerNotFound { .. }) => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Authorization { .. } => ErrorKind::Authorization,
            Self::Repository(_) | Self::Users(_) | Self::Tickets(_) => ErrorKind::Persistence,
            Self::Notification(_) => ErrorKind::Notification,
        }
    }

    pub(crate) const fn forbidden(role: Role, operation: &'static str) -> Self {
        Self::Authorization { role, operation }
    }
}

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;
