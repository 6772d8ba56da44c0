//! Identifier and validated scalar types for the task domain.

use super::TaskDomainError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the wrapped UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a task or test task record.
    TaskId
);
uuid_id!(
    /// Identifier of a blocker recorded on a task.
    BlockerId
);
uuid_id!(
    /// Identifier of a comment recorded on a task.
    CommentId
);

/// The two parallel work-item aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Development work item.
    Task,
    /// QA verification work item.
    TestTask,
}

impl TaskKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::TestTask => "test_task",
        }
    }

    /// Returns the prefix used in human-readable task numbers.
    #[must_use]
    pub const fn number_prefix(self) -> &'static str {
        match self {
            Self::Task => "TASK",
            Self::TestTask => "TEST",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        [Self::Task, Self::TestTask]
            .into_iter()
            .find(|kind| kind.number_prefix() == prefix)
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskKind {
    type Error = TaskDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "task" => Ok(Self::Task),
            "test_task" | "testtask" => Ok(Self::TestTask),
            _ => Err(TaskDomainError::UnknownKind(value.to_owned())),
        }
    }
}

/// Human-readable unique task code such as `TASK-20260105-0001`.
///
/// The trailing sequence is zero padded to at least four digits and grows
/// past that when a day exceeds 9999 allocations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskNumber(String);

impl TaskNumber {
    /// Builds the number for the `sequence`-th allocation of `kind` on `day`.
    #[must_use]
    pub fn compose(kind: TaskKind, day: NaiveDate, sequence: u32) -> Self {
        Self(format!(
            "{}-{}-{sequence:04}",
            kind.number_prefix(),
            day.format("%Y%m%d")
        ))
    }

    /// Parses and validates a stored task number.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTaskNumber`] when the value is not
    /// `PREFIX-YYYYMMDD-NNNN`.
    pub fn parse(value: &str) -> Result<Self, TaskDomainError> {
        let invalid = || TaskDomainError::InvalidTaskNumber(value.to_owned());
        let mut parts = value.split('-');
        let (Some(prefix), Some(date), Some(sequence), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        let digits_only = |part: &str| part.chars().all(|ch| ch.is_ascii_digit());
        let is_valid = TaskKind::from_prefix(prefix).is_some()
            && NaiveDate::parse_from_str(date, "%Y%m%d").is_ok()
            && date.len() == 8
            && sequence.len() >= 4
            && digits_only(sequence);
        if !is_valid {
            return Err(invalid());
        }
        Ok(Self(value.to_owned()))
    }

    /// Returns the aggregate kind encoded in the prefix.
    #[must_use]
    pub fn kind(&self) -> Option<TaskKind> {
        self.0.split('-').next().and_then(TaskKind::from_prefix)
    }

    /// Returns the number as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TaskNumber {
    type Error = TaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TaskNumber> for String {
    fn from(number: TaskNumber) -> Self {
        number.0
    }
}

impl fmt::Display for TaskNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
