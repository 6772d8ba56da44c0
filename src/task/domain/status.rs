//! Workflow status, urgency and priority scalars.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Workflow status shared by tasks and test tasks.
///
/// Any status may follow any other; the workflow derives effects from each
/// change rather than forbidding transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Not started.
    ToDo,
    /// Being worked on.
    InProgress,
    /// Waiting on an open blocker.
    Blocked,
    /// Refused.
    Declined,
    /// Under QA verification.
    Testing,
    /// Verification failed.
    TestFailed,
    /// Verification passed.
    TestPassed,
    /// Completed.
    Done,
    /// Testing ran longer than the estimate.
    Expired,
    /// Due date passed before work started.
    Overdue,
}

impl TaskStatus {
    /// All statuses in declaration order.
    pub const ALL: [Self; 10] = [
        Self::ToDo,
        Self::InProgress,
        Self::Blocked,
        Self::Declined,
        Self::Testing,
        Self::TestFailed,
        Self::TestPassed,
        Self::Done,
        Self::Expired,
        Self::Overdue,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ToDo => "ToDo",
            Self::InProgress => "InProgress",
            Self::Blocked => "Blocked",
            Self::Declined => "Declined",
            Self::Testing => "Testing",
            Self::TestFailed => "TestFailed",
            Self::TestPassed => "TestPassed",
            Self::Done => "Done",
            Self::Expired => "Expired",
            Self::Overdue => "Overdue",
        }
    }

    /// Returns `true` for statuses that archive the task.
    ///
    /// Terminal statuses are soft: privileged roles may still move a task
    /// out of them, which is recorded as a reopen.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Done | Self::TestPassed | Self::TestFailed | Self::Expired | Self::Overdue
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = TaskDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let wanted = value.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| TaskDomainError::UnknownStatus(value.to_owned()))
    }
}

/// How urgently a task needs attention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Urgency {
    /// Drop everything.
    Critical,
    /// Next in line.
    High,
    /// Normal scheduling.
    #[default]
    Medium,
    /// Whenever convenient.
    Low,
}

impl Urgency {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priority in the inclusive range 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Priority(u8);

impl Priority {
    /// Lowest accepted value.
    pub const MIN: u8 = 1;
    /// Highest accepted value.
    pub const MAX: u8 = 5;

    /// Creates a validated priority.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidPriority`] outside 1..=5.
    pub const fn new(value: u8) -> Result<Self, TaskDomainError> {
        if value < Self::MIN || value > Self::MAX {
            return Err(TaskDomainError::InvalidPriority(value));
        }
        Ok(Self(value))
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self(3)
    }
}

impl TryFrom<u8> for Priority {
    type Error = TaskDomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
