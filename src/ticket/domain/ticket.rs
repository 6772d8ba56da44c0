//! Ticket aggregate root and its status lifecycle.

use super::{ParseTicketStatusError, TicketDomainError, TicketId};
use crate::identity::domain::{Actor, Role, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ticket lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Submitted by the client, not yet picked up.
    Open,
    /// Work has been planned or started.
    InProgress,
    /// Work is complete and awaiting client confirmation.
    Resolved,
    /// Confirmed and closed.
    Closed,
    /// Refused by staff.
    Rejected,
}

impl TicketStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
            Self::Rejected => "rejected",
        }
    }

    /// Returns `true` when the ticket lifecycle permits moving to `target`.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Open, Self::InProgress | Self::Rejected)
                | (Self::InProgress, Self::Resolved | Self::Rejected)
                | (Self::Resolved, Self::Closed | Self::InProgress)
        )
    }

    /// Returns `true` for states that accept no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Rejected)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TicketStatus {
    type Error = ParseTicketStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseTicketStatusError(value.to_owned())),
        }
    }
}

/// Billing state of a ticket, tracked independently of its status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancialStatus {
    /// No invoice issued yet.
    Unbilled,
    /// Invoice issued.
    Billed,
    /// Invoice settled.
    Paid,
}

impl FinancialStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unbilled => "unbilled",
            Self::Billed => "billed",
            Self::Paid => "paid",
        }
    }
}

impl TryFrom<&str> for FinancialStatus {
    type Error = ParseTicketStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "unbilled" => Ok(Self::Unbilled),
            "billed" => Ok(Self::Billed),
            "paid" => Ok(Self::Paid),
            _ => Err(ParseTicketStatusError(value.to_owned())),
        }
    }
}

/// Top-level client request owning zero or more tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    id: TicketId,
    title: String,
    description: String,
    status: TicketStatus,
    financial_status: FinancialStatus,
    created_by: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTicketData {
    /// Persisted identifier.
    pub id: TicketId,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: String,
    /// Persisted lifecycle state.
    pub status: TicketStatus,
    /// Persisted billing state.
    pub financial_status: FinancialStatus,
    /// Persisted creator.
    pub created_by: UserId,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Opens a new ticket.
    ///
    /// # Errors
    ///
    /// Returns [`TicketDomainError::EmptyTitle`] when the title is blank.
    pub fn open(
        title: impl Into<String>,
        description: impl Into<String>,
        created_by: UserId,
        clock: &impl Clock,
    ) -> Result<Self, TicketDomainError> {
        let raw_title = title.into();
        let normalized_title = raw_title.trim();
        if normalized_title.is_empty() {
            return Err(TicketDomainError::EmptyTitle);
        }
        let timestamp = clock.utc();
        Ok(Self {
            id: TicketId::new(),
            title: normalized_title.to_owned(),
            description: description.into().trim().to_owned(),
            status: TicketStatus::Open,
            financial_status: FinancialStatus::Unbilled,
            created_by,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a ticket from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTicketData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            status: data.status,
            financial_status: data.financial_status,
            created_by: data.created_by,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the ticket identifier.
    #[must_use]
    pub const fn id(&self) -> TicketId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn status(&self) -> TicketStatus {
        self.status
    }

    /// Returns the billing state.
    #[must_use]
    pub const fn financial_status(&self) -> FinancialStatus {
        self.financial_status
    }

    /// Returns the creating user.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns `true` when `actor` may view or act on this ticket.
    ///
    /// Staff roles that triage tickets see all of them; everybody else only
    /// sees tickets they opened.
    #[must_use]
    pub fn is_accessible_by(&self, actor: &Actor) -> bool {
        match actor.role() {
            Role::Admin | Role::ProjectManager | Role::AgentCommercial => true,
            Role::Client
            | Role::ResponsibleClient
            | Role::GroupLeader
            | Role::Developer
            | Role::ResponsibleTester
            | Role::Tester => self.created_by == actor.id(),
        }
    }

    /// Moves the ticket to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`TicketDomainError::InvalidStatusTransition`] when the
    /// lifecycle forbids the move.
    pub fn transition_to(
        &mut self,
        target: TicketStatus,
        clock: &impl Clock,
    ) -> Result<(), TicketDomainError> {
        if !self.status.can_transition_to(target) {
            return Err(TicketDomainError::InvalidStatusTransition {
                ticket_id: self.id,
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        self.updated_at = clock.utc();
        Ok(())
    }

    /// Records a new billing state.
    pub fn set_financial_status(&mut self, status: FinancialStatus, clock: &impl Clock) {
        self.financial_status = status;
        self.updated_at = clock.utc();
    }
}
