//! Storage-agnostic predicates over tasks.
//!
//! The scope resolver builds these from an actor's role; adapters either
//! evaluate them in memory with [`TaskPredicate::matches`] or translate them
//! into SQL.

use super::{Task, TaskKind, TaskStatus};
use crate::identity::domain::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Optional narrowing of a role's scope to one relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeFilter {
    /// Tasks the actor created.
    Created,
    /// Tasks assigned to the actor.
    Assigned,
}

/// Boolean predicate over task fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskPredicate {
    /// Matches every task.
    All,
    /// Created by the user.
    CreatedBy(UserId),
    /// Created by any of the users; empty matches nothing.
    CreatedByAny(Vec<UserId>),
    /// The user is among the assignees.
    AssignedTo(UserId),
    /// Any of the users is among the assignees; empty matches nothing.
    AssignedToAny(Vec<UserId>),
    /// Current status equals the value.
    StatusIs(TaskStatus),
    /// Aggregate kind equals the value.
    KindIs(TaskKind),
    /// An estimate is recorded.
    HasEstimate,
    /// A due date strictly before the instant is recorded.
    DueBefore(DateTime<Utc>),
    /// All operands hold; empty matches everything.
    And(Vec<Self>),
    /// At least one operand holds; empty matches nothing.
    Or(Vec<Self>),
}

impl TaskPredicate {
    /// Combines two predicates with logical AND, dropping `All` operands.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::All, rhs) => rhs,
            (lhs, Self::All) => lhs,
            (Self::And(mut lhs), Self::And(rhs)) => {
                lhs.extend(rhs);
                Self::And(lhs)
            }
            (Self::And(mut lhs), rhs) => {
                lhs.push(rhs);
                Self::And(lhs)
            }
            (lhs, rhs) => Self::And(vec![lhs, rhs]),
        }
    }

    /// Returns `true` when the predicate restricts nothing.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        match self {
            Self::All => true,
            Self::And(operands) => operands.iter().all(Self::is_unrestricted),
            _ => false,
        }
    }

    /// Evaluates the predicate against `task`.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::CreatedBy(user) => task.created_by() == *user,
            Self::CreatedByAny(users) => users.contains(&task.created_by()),
            Self::AssignedTo(user) => task.is_assigned(*user),
            Self::AssignedToAny(users) => users.iter().any(|user| task.is_assigned(*user)),
            Self::StatusIs(status) => task.status() == *status,
            Self::KindIs(kind) => task.kind() == *kind,
            Self::HasEstimate => task.estimated_hours().is_some(),
            Self::DueBefore(instant) => task.due_date().is_some_and(|due| due < *instant),
            Self::And(operands) => operands.iter().all(|operand| operand.matches(task)),
            Self::Or(operands) => operands.iter().any(|operand| operand.matches(task)),
        }
    }
}
