//! Domain model for tasks and test tasks.
//!
//! The aggregate owns its blockers, comments, attachments, mentions and an
//! append-only history. Infrastructure concerns stay outside this module.

mod access;
mod blocker;
mod comment;
mod error;
mod history;
mod ids;
mod query;
mod status;
mod task;

pub use access::{has_access, may_act_on, may_create};
pub use blocker::Blocker;
pub use comment::{Attachment, Comment, FileDescriptor, Mention};
pub use error::TaskDomainError;
pub use history::{HistoryAction, HistoryDetails, HistoryEntry, PerformedBy};
pub use ids::{BlockerId, CommentId, TaskId, TaskKind, TaskNumber};
pub use query::{ScopeFilter, TaskPredicate};
pub use status::{Priority, TaskStatus, Urgency};
pub use task::{
    BlockerAdded, BlockerResolved, CommentAdded, NewTask, StatusTransition, Task, TaskChanges,
};

pub(crate) use task::elapsed_hours;
