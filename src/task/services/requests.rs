//! Request payloads accepted at the service boundary.
//!
//! Boundary quirks are normalised here so the aggregate only ever sees
//! clean values: assignees arrive as a single id or a list and become a set,
//! and legacy upload names are re-decoded to UTF-8.

use crate::identity::domain::UserId;
use crate::task::domain::{FileDescriptor, TaskId, TaskKind, TaskStatus, Urgency};
use crate::ticket::domain::TicketId;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeSet;

/// Assignees as supplied by callers: one identifier or a list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AssigneeInput {
    /// A single user.
    One(UserId),
    /// Zero or more users.
    Many(Vec<UserId>),
}

impl AssigneeInput {
    /// Normalises the input into a set.
    #[must_use]
    pub fn into_set(self) -> BTreeSet<UserId> {
        match self {
            Self::One(user) => BTreeSet::from([user]),
            Self::Many(users) => users.into_iter().collect(),
        }
    }
}

impl Default for AssigneeInput {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl From<UserId> for AssigneeInput {
    fn from(user: UserId) -> Self {
        Self::One(user)
    }
}

impl From<Vec<UserId>> for AssigneeInput {
    fn from(users: Vec<UserId>) -> Self {
        Self::Many(users)
    }
}

/// Request payload for creating a task or test task.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    kind: TaskKind,
    name: String,
    description: String,
    #[serde(default)]
    urgency: Option<Urgency>,
    #[serde(default)]
    priority: Option<u8>,
    #[serde(default)]
    assigned_to: AssigneeInput,
    #[serde(default)]
    ticket: Option<TicketId>,
    #[serde(default)]
    parent_task: Option<TaskId>,
    #[serde(default)]
    due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    estimated_hours: Option<f64>,
}

impl CreateTaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(kind: TaskKind, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            description: description.into(),
            urgency: None,
            priority: None,
            assigned_to: AssigneeInput::default(),
            ticket: None,
            parent_task: None,
            due_date: None,
            estimated_hours: None,
        }
    }

    /// Sets the urgency.
    #[must_use]
    pub const fn with_urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = Some(urgency);
        self
    }

    /// Sets the priority; validated when the task is created.
    #[must_use]
    pub const fn with_priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the assignees.
    #[must_use]
    pub fn with_assignees(mut self, assignees: impl Into<AssigneeInput>) -> Self {
        self.assigned_to = assignees.into();
        self
    }

    /// Links the task to a ticket.
    #[must_use]
    pub const fn with_ticket(mut self, ticket: TicketId) -> Self {
        self.ticket = Some(ticket);
        self
    }

    /// Makes the task a subtask of `parent`.
    #[must_use]
    pub const fn with_parent(mut self, parent: TaskId) -> Self {
        self.parent_task = Some(parent);
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the estimated effort in hours.
    #[must_use]
    pub const fn with_estimated_hours(mut self, hours: f64) -> Self {
        self.estimated_hours = Some(hours);
        self
    }

    pub(super) fn into_parts(self) -> CreateTaskParts {
        CreateTaskParts {
            kind: self.kind,
            name: self.name,
            description: self.description,
            urgency: self.urgency.unwrap_or_default(),
            priority: self.priority,
            assigned_to: self.assigned_to.into_set(),
            ticket: self.ticket,
            parent_task: self.parent_task,
            due_date: self.due_date,
            estimated_hours: self.estimated_hours,
        }
    }
}

pub(super) struct CreateTaskParts {
    pub(super) kind: TaskKind,
    pub(super) name: String,
    pub(super) description: String,
    pub(super) urgency: Urgency,
    pub(super) priority: Option<u8>,
    pub(super) assigned_to: BTreeSet<UserId>,
    pub(super) ticket: Option<TicketId>,
    pub(super) parent_task: Option<TaskId>,
    pub(super) due_date: Option<DateTime<Utc>>,
    pub(super) estimated_hours: Option<f64>,
}

/// Partial update of a task.
///
/// A status carried by the patch goes through the same state machine as a
/// direct status change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub(super) name: Option<String>,
    pub(super) description: Option<String>,
    pub(super) urgency: Option<Urgency>,
    pub(super) priority: Option<u8>,
    pub(super) due_date: Option<Option<DateTime<Utc>>>,
    pub(super) estimated_hours: Option<Option<f64>>,
    pub(super) status: Option<TaskStatus>,
}

impl TaskPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Renames the task.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replaces the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Changes the urgency.
    #[must_use]
    pub const fn urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = Some(urgency);
        self
    }

    /// Changes the priority.
    #[must_use]
    pub const fn priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets or clears the due date.
    #[must_use]
    pub const fn due_date(mut self, due_date: Option<DateTime<Utc>>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets or clears the estimate.
    #[must_use]
    pub const fn estimated_hours(mut self, hours: Option<f64>) -> Self {
        self.estimated_hours = Some(hours);
        self
    }

    /// Requests a status change alongside the field update.
    #[must_use]
    pub const fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// A file already handed to file storage.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    original_name: String,
    storage_ref: String,
}

impl UploadedFile {
    /// Describes an upload whose name is already UTF-8.
    #[must_use]
    pub fn new(original_name: impl Into<String>, storage_ref: impl Into<String>) -> Self {
        Self {
            original_name: original_name.into(),
            storage_ref: storage_ref.into(),
        }
    }

    /// Describes an upload whose name may have been mis-decoded as Latin-1.
    #[must_use]
    pub fn from_legacy(raw_name: &str, storage_ref: impl Into<String>) -> Self {
        Self::new(decode_legacy_filename(raw_name), storage_ref)
    }

    /// Returns the display name.
    #[must_use]
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// Returns the storage reference.
    #[must_use]
    pub fn storage_ref(&self) -> &str {
        &self.storage_ref
    }

    /// Converts into the descriptor stored on a comment.
    #[must_use]
    pub fn into_descriptor(self) -> FileDescriptor {
        FileDescriptor {
            original_name: self.original_name,
            storage_ref: self.storage_ref,
        }
    }
}

/// Request payload for adding a comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentRequest {
    pub(super) text: String,
    #[serde(default)]
    pub(super) mentions: Vec<UserId>,
    #[serde(default)]
    pub(super) files: Vec<UploadedFile>,
}

impl AddCommentRequest {
    /// Creates a comment request.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mentions: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Adds explicitly mentioned users.
    #[must_use]
    pub fn with_mentions(mut self, users: impl IntoIterator<Item = UserId>) -> Self {
        self.mentions.extend(users);
        self
    }

    /// Adds uploaded files.
    #[must_use]
    pub fn with_files(mut self, files: impl IntoIterator<Item = UploadedFile>) -> Self {
        self.files.extend(files);
        self
    }
}

/// Re-decodes a file name whose UTF-8 bytes were read as Latin-1.
///
/// Names containing characters outside Latin-1, or whose bytes are not
/// valid UTF-8, are returned unchanged.
// TODO: remove once every stored upload name has been migrated to UTF-8.
#[must_use]
pub fn decode_legacy_filename(name: &str) -> String {
    let bytes: Option<Vec<u8>> = name
        .chars()
        .map(|ch| u8::try_from(u32::from(ch)).ok())
        .collect();
    bytes
        .and_then(|raw| String::from_utf8(raw).ok())
        .unwrap_or_else(|| name.to_owned())
}
