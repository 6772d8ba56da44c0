//! Task aggregate root and its workflow state machine.

use super::comment::{mark_notified, merge_mentions};
use super::{
    Attachment, Blocker, BlockerId, Comment, CommentId, FileDescriptor, HistoryDetails,
    HistoryEntry, Mention, PerformedBy, Priority, TaskDomainError, TaskId, TaskKind, TaskNumber,
    TaskStatus, Urgency,
};
use crate::identity::domain::UserId;
use crate::ticket::domain::TicketId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Task or test task aggregate root.
///
/// Every status change goes through [`Task::change_status`], which appends
/// exactly one `statusChanged` history entry per effective transition and
/// derives the dependent timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    kind: TaskKind,
    number: TaskNumber,
    name: String,
    description: String,
    status: TaskStatus,
    urgency: Urgency,
    priority: Priority,
    created_by: UserId,
    assigned_to: BTreeSet<UserId>,
    ticket: Option<TicketId>,
    parent_task: Option<TaskId>,
    #[serde(default)]
    subtasks: Vec<TaskId>,
    due_date: Option<DateTime<Utc>>,
    estimated_hours: Option<f64>,
    actual_hours: Option<f64>,
    #[serde(default)]
    attachments: Vec<Attachment>,
    #[serde(default)]
    blockers: Vec<Blocker>,
    #[serde(default)]
    comments: Vec<Comment>,
    #[serde(default)]
    history: Vec<HistoryEntry>,
    #[serde(default)]
    mentions: Vec<Mention>,
    testing_started_at: Option<DateTime<Utc>>,
    archived_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for creating a task.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    /// Aggregate kind.
    pub kind: TaskKind,
    /// Allocated unique number.
    pub number: TaskNumber,
    /// Task name.
    pub name: String,
    /// Task description.
    pub description: String,
    /// Urgency.
    pub urgency: Urgency,
    /// Priority.
    pub priority: Priority,
    /// Creating user.
    pub created_by: UserId,
    /// Initial assignees.
    pub assigned_to: BTreeSet<UserId>,
    /// Parent ticket, if any.
    pub ticket: Option<TicketId>,
    /// Parent task, if any.
    pub parent_task: Option<TaskId>,
    /// Due date, if any.
    pub due_date: Option<DateTime<Utc>>,
    /// Estimated effort in hours, if any.
    pub estimated_hours: Option<f64>,
}

/// Partial update of non-status fields.
///
/// `None` leaves a field untouched; the nested options clear a field when
/// set to `Some(None)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskChanges {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New urgency.
    pub urgency: Option<Urgency>,
    /// New priority.
    pub priority: Option<Priority>,
    /// New or cleared due date.
    pub due_date: Option<Option<DateTime<Utc>>>,
    /// New or cleared estimate.
    pub estimated_hours: Option<Option<f64>>,
}

/// Outcome of an effective status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTransition {
    /// Status before the change.
    pub previous: TaskStatus,
    /// Status after the change.
    pub current: TaskStatus,
    /// Whether the task left a terminal status.
    pub reopened: bool,
}

/// Outcome of adding a blocker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockerAdded {
    /// The recorded blocker.
    pub blocker: Blocker,
    /// The status change forced by the blocker, unless already blocked.
    pub transition: Option<StatusTransition>,
}

/// Outcome of resolving a blocker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockerResolved {
    /// The resolved blocker.
    pub blocker: Blocker,
    /// The status restored because no open blocker remained.
    pub transition: Option<StatusTransition>,
}

/// Outcome of adding a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentAdded {
    /// Comment identifier.
    pub comment_id: CommentId,
    /// Users newly mentioned by the comment.
    pub mentioned: Vec<UserId>,
}

impl Task {
    /// Creates a task in `ToDo`, recording `created` and, when users are
    /// assigned up front, `assigned` history entries.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when the name or description is blank or
    /// the estimate is negative or not finite.
    pub fn create(new: NewTask, clock: &impl Clock) -> Result<Self, TaskDomainError> {
        let NewTask {
            kind,
            number,
            name,
            description,
            urgency,
            priority,
            created_by,
            assigned_to,
            ticket,
            parent_task,
            due_date,
            estimated_hours,
        } = new;
        let timestamp = clock.utc();
        let mut task = Self {
            id: TaskId::new(),
            kind,
            number: number.clone(),
            name: required_text(&name, TaskDomainError::EmptyName)?,
            description: required_text(&description, TaskDomainError::EmptyDescription)?,
            status: TaskStatus::ToDo,
            urgency,
            priority,
            created_by,
            assigned_to: BTreeSet::new(),
            ticket,
            parent_task,
            subtasks: Vec::new(),
            due_date,
            estimated_hours: validated_estimate(estimated_hours)?,
            actual_hours: None,
            attachments: Vec::new(),
            blockers: Vec::new(),
            comments: Vec::new(),
            history: Vec::new(),
            mentions: Vec::new(),
            testing_started_at: None,
            archived_at: None,
            created_at: timestamp,
            updated_at: timestamp,
        };
        task.record(
            PerformedBy::User(created_by),
            timestamp,
            HistoryDetails::Created { number },
        );
        task.assign(assigned_to, created_by, clock);
        Ok(task)
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the aggregate kind.
    #[must_use]
    pub const fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Returns the unique human-readable number.
    #[must_use]
    pub const fn number(&self) -> &TaskNumber {
        &self.number
    }

    /// Returns the task name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the task description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the workflow status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the urgency.
    #[must_use]
    pub const fn urgency(&self) -> Urgency {
        self.urgency
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the creating user.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Returns the assignee set.
    #[must_use]
    pub const fn assigned_to(&self) -> &BTreeSet<UserId> {
        &self.assigned_to
    }

    /// Returns `true` when `user` is assigned.
    #[must_use]
    pub fn is_assigned(&self, user: UserId) -> bool {
        self.assigned_to.contains(&user)
    }

    /// Returns the parent ticket, if any.
    #[must_use]
    pub const fn ticket(&self) -> Option<TicketId> {
        self.ticket
    }

    /// Returns the parent task, if any.
    #[must_use]
    pub const fn parent_task(&self) -> Option<TaskId> {
        self.parent_task
    }

    /// Returns the child task identifiers.
    #[must_use]
    pub fn subtasks(&self) -> &[TaskId] {
        &self.subtasks
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Returns the estimated effort in hours, if any.
    #[must_use]
    pub const fn estimated_hours(&self) -> Option<f64> {
        self.estimated_hours
    }

    /// Returns the hours spent between starting work and entering testing.
    #[must_use]
    pub const fn actual_hours(&self) -> Option<f64> {
        self.actual_hours
    }

    /// Returns the attachments.
    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Returns all blockers, resolved or not.
    #[must_use]
    pub fn blockers(&self) -> &[Blocker] {
        &self.blockers
    }

    /// Returns the blockers that are still open.
    pub fn open_blockers(&self) -> impl Iterator<Item = &Blocker> {
        self.blockers.iter().filter(|blocker| !blocker.resolved)
    }

    /// Returns the comments, oldest first.
    #[must_use]
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Returns the comment with `id`, if present.
    #[must_use]
    pub fn comment(&self, id: CommentId) -> Option<&Comment> {
        self.comments.iter().find(|comment| comment.id == id)
    }

    /// Returns the history, oldest first.
    #[must_use]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Returns the task-level mentions.
    #[must_use]
    pub fn mentions(&self) -> &[Mention] {
        &self.mentions
    }

    /// Returns when a test task last entered `Testing`.
    #[must_use]
    pub const fn testing_started_at(&self) -> Option<DateTime<Utc>> {
        self.testing_started_at
    }

    /// Returns when the task entered its current terminal status.
    #[must_use]
    pub const fn archived_at(&self) -> Option<DateTime<Utc>> {
        self.archived_at
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the most recent history entry that moved the task into
    /// `status`.
    #[must_use]
    pub fn latest_entry_into(&self, status: TaskStatus) -> Option<&HistoryEntry> {
        self.history.iter().rev().find(|entry| entry.entered(status))
    }

    /// Moves the task to `target`.
    ///
    /// A change to the current status is a no-op and returns `None`.
    /// Otherwise one `statusChanged` entry is appended and the derived
    /// effects are applied:
    ///
    /// - `InProgress → Testing` computes [`Task::actual_hours`] from the
    ///   latest entry into `InProgress`,
    /// - a test task entering `Testing` stamps
    ///   [`Task::testing_started_at`],
    /// - entering a terminal status stamps [`Task::archived_at`]; leaving
    ///   one clears it and flags the entry as a reopen.
    pub fn change_status(
        &mut self,
        target: TaskStatus,
        performed_by: PerformedBy,
        reason: Option<String>,
        clock: &impl Clock,
    ) -> Option<StatusTransition> {
        let previous = self.status;
        if previous == target {
            return None;
        }
        let now = clock.utc();
        if previous == TaskStatus::InProgress && target == TaskStatus::Testing {
            self.actual_hours = self
                .latest_entry_into(TaskStatus::InProgress)
                .map(|entry| hours_between(entry.timestamp, now));
        }
        if target == TaskStatus::Testing && self.kind == TaskKind::TestTask {
            self.testing_started_at = Some(now);
        }
        let reopened = previous.is_terminal();
        if target.is_terminal() {
            self.archived_at = Some(now);
        } else if reopened {
            self.archived_at = None;
        }
        self.status = target;
        self.record(
            performed_by,
            now,
            HistoryDetails::StatusChanged {
                previous_status: previous,
                new_status: target,
                reason: reason.filter(|text| !text.trim().is_empty()),
                reopened,
            },
        );
        Some(StatusTransition {
            previous,
            current: target,
            reopened,
        })
    }

    /// Applies a partial update and returns the names of the fields that
    /// actually changed.
    ///
    /// An `updated` history entry is appended only when something changed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] for a blank name or description or an
    /// invalid estimate; the task is left untouched.
    pub fn apply_changes(
        &mut self,
        changes: TaskChanges,
        performed_by: UserId,
        clock: &impl Clock,
    ) -> Result<Vec<String>, TaskDomainError> {
        let TaskChanges {
            name,
            description,
            urgency,
            priority,
            due_date,
            estimated_hours,
        } = changes;
        let new_name = name
            .map(|value| required_text(&value, TaskDomainError::EmptyName))
            .transpose()?;
        let new_description = description
            .map(|value| required_text(&value, TaskDomainError::EmptyDescription))
            .transpose()?;
        let new_estimate = estimated_hours.map(validated_estimate).transpose()?;

        let mut fields: Vec<String> = Vec::new();
        replace_if_changed(&mut self.name, new_name, "name", &mut fields);
        replace_if_changed(
            &mut self.description,
            new_description,
            "description",
            &mut fields,
        );
        replace_if_changed(&mut self.urgency, urgency, "urgency", &mut fields);
        replace_if_changed(&mut self.priority, priority, "priority", &mut fields);
        replace_if_changed(&mut self.due_date, due_date, "dueDate", &mut fields);
        replace_if_changed(
            &mut self.estimated_hours,
            new_estimate,
            "estimatedHours",
            &mut fields,
        );
        if !fields.is_empty() {
            self.record(
                PerformedBy::User(performed_by),
                clock.utc(),
                HistoryDetails::Updated {
                    fields: fields.clone(),
                },
            );
        }
        Ok(fields)
    }

    /// Adds users to the assignee set and returns those not already
    /// assigned.
    pub fn assign(
        &mut self,
        users: impl IntoIterator<Item = UserId>,
        performed_by: UserId,
        clock: &impl Clock,
    ) -> Vec<UserId> {
        let added: Vec<UserId> = users
            .into_iter()
            .filter(|user| self.assigned_to.insert(*user))
            .collect();
        if !added.is_empty() {
            self.record(
                PerformedBy::User(performed_by),
                clock.utc(),
                HistoryDetails::Assigned {
                    users: added.clone(),
                },
            );
        }
        added
    }

    /// Records a blocker and forces the task into `Blocked`.
    ///
    /// The status change (when the task was not already blocked), the
    /// blocker and the `blocked` entry are applied together, so the latest
    /// history entry is always `blocked`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyBlockerReason`] for a blank reason.
    pub fn add_blocker(
        &mut self,
        reason: &str,
        description: Option<String>,
        performed_by: UserId,
        clock: &impl Clock,
    ) -> Result<BlockerAdded, TaskDomainError> {
        let trimmed = required_text(reason, TaskDomainError::EmptyBlockerReason)?;
        let now = clock.utc();
        let blocker = Blocker {
            id: BlockerId::new(),
            reason: trimmed.clone(),
            description: description.filter(|text| !text.trim().is_empty()),
            created_by: performed_by,
            created_at: now,
            resolved: false,
            resolved_by: None,
            resolved_at: None,
        };
        let transition = self.change_status(
            TaskStatus::Blocked,
            PerformedBy::User(performed_by),
            Some(trimmed.clone()),
            clock,
        );
        self.blockers.push(blocker.clone());
        self.record(
            PerformedBy::User(performed_by),
            now,
            HistoryDetails::Blocked {
                task_id: self.id,
                blocker_id: blocker.id,
                reason: trimmed,
            },
        );
        Ok(BlockerAdded {
            blocker,
            transition,
        })
    }

    /// Resolves a blocker.
    ///
    /// When it was the last open blocker and the task is still `Blocked`,
    /// the status held before blocking is restored and an `unblocked`
    /// entry follows the `statusChanged` entry. A task with no recorded
    /// entry into `Blocked` returns to `ToDo`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::BlockerNotFound`] or
    /// [`TaskDomainError::BlockerAlreadyResolved`].
    pub fn resolve_blocker(
        &mut self,
        blocker_id: BlockerId,
        performed_by: UserId,
        clock: &impl Clock,
    ) -> Result<BlockerResolved, TaskDomainError> {
        let now = clock.utc();
        let task_id = self.id;
        let blocker = self
            .blockers
            .iter_mut()
            .find(|blocker| blocker.id == blocker_id)
            .ok_or(TaskDomainError::BlockerNotFound {
                task_id,
                blocker_id,
            })?;
        if blocker.resolved {
            return Err(TaskDomainError::BlockerAlreadyResolved(blocker_id));
        }
        blocker.resolve(performed_by, now);
        let resolved = blocker.clone();
        self.updated_at = now;

        if self.status != TaskStatus::Blocked || self.open_blockers().next().is_some() {
            return Ok(BlockerResolved {
                blocker: resolved,
                transition: None,
            });
        }
        let restored = self.status_before_blocking();
        let transition = self.change_status(
            restored,
            PerformedBy::User(performed_by),
            Some("all blockers resolved".to_owned()),
            clock,
        );
        self.record(
            PerformedBy::User(performed_by),
            now,
            HistoryDetails::Unblocked {
                task_id,
                blocker_id,
                restored_status: restored,
            },
        );
        Ok(BlockerResolved {
            blocker: resolved,
            transition,
        })
    }

    /// Appends a comment and merges `mentioned` into its mention set.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyComment`] for blank text.
    pub fn add_comment(
        &mut self,
        text: &str,
        author: UserId,
        files: Vec<FileDescriptor>,
        mentioned: impl IntoIterator<Item = UserId>,
        clock: &impl Clock,
    ) -> Result<CommentAdded, TaskDomainError> {
        if text.trim().is_empty() {
            return Err(TaskDomainError::EmptyComment);
        }
        let now = clock.utc();
        let mut comment = Comment {
            id: CommentId::new(),
            text: text.to_owned(),
            author,
            created_at: now,
            mentions: Vec::new(),
            files,
        };
        let added = merge_mentions(&mut comment.mentions, mentioned);
        let comment_id = comment.id;
        self.comments.push(comment);
        self.record(
            PerformedBy::User(author),
            now,
            HistoryDetails::Commented { comment_id },
        );
        Ok(CommentAdded {
            comment_id,
            mentioned: added,
        })
    }

    /// Flags the given users' mentions on a comment as notified.
    pub fn mark_comment_mentions_notified(&mut self, comment_id: CommentId, users: &[UserId]) {
        if let Some(comment) = self
            .comments
            .iter_mut()
            .find(|comment| comment.id == comment_id)
        {
            mark_notified(&mut comment.mentions, users);
        }
    }

    /// Adds task-level mentions and returns the users not mentioned before.
    pub fn add_mentions(&mut self, users: impl IntoIterator<Item = UserId>) -> Vec<UserId> {
        merge_mentions(&mut self.mentions, users)
    }

    /// Flags the given users' task-level mentions as notified.
    pub fn mark_mentions_notified(&mut self, users: &[UserId]) {
        mark_notified(&mut self.mentions, users);
    }

    /// Records an attachment.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyAttachment`] when the name or storage
    /// reference is blank.
    pub fn add_attachment(
        &mut self,
        name: &str,
        storage_ref: &str,
        performed_by: UserId,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if name.trim().is_empty() || storage_ref.trim().is_empty() {
            return Err(TaskDomainError::EmptyAttachment);
        }
        let now = clock.utc();
        self.attachments.push(Attachment {
            name: name.trim().to_owned(),
            storage_ref: storage_ref.to_owned(),
            uploaded_by: performed_by,
            uploaded_at: now,
        });
        self.record(
            PerformedBy::User(performed_by),
            now,
            HistoryDetails::Updated {
                fields: vec!["attachments".to_owned()],
            },
        );
        Ok(())
    }

    /// Records a verification result on a task in `Testing`.
    ///
    /// The task moves to `TestPassed` or `TestFailed` and a `tested` entry
    /// follows the status change.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotInTesting`] outside `Testing`.
    pub fn record_test_result(
        &mut self,
        passed: bool,
        notes: Option<String>,
        performed_by: UserId,
        clock: &impl Clock,
    ) -> Result<StatusTransition, TaskDomainError> {
        if self.status != TaskStatus::Testing {
            return Err(TaskDomainError::NotInTesting {
                task_id: self.id,
                status: self.status,
            });
        }
        let target = if passed {
            TaskStatus::TestPassed
        } else {
            TaskStatus::TestFailed
        };
        let notes_text = notes.filter(|text| !text.trim().is_empty());
        let transition = self
            .change_status(
                target,
                PerformedBy::User(performed_by),
                notes_text.clone(),
                clock,
            )
            .unwrap_or(StatusTransition {
                previous: TaskStatus::Testing,
                current: target,
                reopened: false,
            });
        self.record(
            PerformedBy::User(performed_by),
            clock.utc(),
            HistoryDetails::Tested {
                passed,
                notes: notes_text,
            },
        );
        Ok(transition)
    }

    /// Returns `true` when this task may hold `child` as a subtask.
    #[must_use]
    pub fn accepts_subtask_of_kind(&self, child: TaskKind) -> bool {
        self.parent_task.is_none() && self.kind == child
    }

    /// Records `child` as a subtask.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidParent`] when this task is itself
    /// a subtask.
    pub fn add_subtask(
        &mut self,
        child: TaskId,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if self.parent_task.is_some() {
            return Err(TaskDomainError::InvalidParent(self.id));
        }
        if !self.subtasks.contains(&child) {
            self.subtasks.push(child);
            self.updated_at = clock.utc();
        }
        Ok(())
    }

    fn status_before_blocking(&self) -> TaskStatus {
        self.history
            .iter()
            .rev()
            .find_map(|entry| match entry.details {
                HistoryDetails::StatusChanged {
                    previous_status,
                    new_status: TaskStatus::Blocked,
                    ..
                } => Some(previous_status),
                _ => None,
            })
            .unwrap_or(TaskStatus::ToDo)
    }

    fn record(
        &mut self,
        performed_by: PerformedBy,
        timestamp: DateTime<Utc>,
        details: HistoryDetails,
    ) {
        self.history.push(HistoryEntry {
            performed_by,
            timestamp,
            details,
        });
        self.updated_at = timestamp;
    }
}

fn required_text(value: &str, error: TaskDomainError) -> Result<String, TaskDomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(error);
    }
    Ok(trimmed.to_owned())
}

fn validated_estimate(estimate: Option<f64>) -> Result<Option<f64>, TaskDomainError> {
    match estimate {
        Some(hours) if !hours.is_finite() || hours.is_sign_negative() => {
            Err(TaskDomainError::InvalidEstimate(hours))
        }
        other => Ok(other),
    }
}

fn replace_if_changed<T: PartialEq>(
    field: &mut T,
    candidate: Option<T>,
    name: &str,
    changed: &mut Vec<String>,
) {
    let Some(value) = candidate else {
        return;
    };
    if *field != value {
        *field = value;
        changed.push(name.to_owned());
    }
}

/// Returns the hours from `start` to `end`, rounded to two decimal places.
#[expect(
    clippy::float_arithmetic,
    reason = "hour figures are reported rounded to two decimal places"
)]
fn hours_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (elapsed_hours(start, end) * 100.0).round() / 100.0
}

/// Returns the exact hours from `start` to `end` at millisecond precision.
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "elapsed time is compared against fractional hour estimates"
)]
pub(crate) fn elapsed_hours(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / 3_600_000.0
}
