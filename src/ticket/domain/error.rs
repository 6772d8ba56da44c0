//! Error types for ticket domain validation and parsing.

use super::{TicketId, TicketStatus};
use thiserror::Error;

/// Errors returned while constructing or mutating tickets.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TicketDomainError {
    /// The ticket title is empty after trimming.
    #[error("ticket title must not be empty")]
    EmptyTitle,

    /// The requested status change is not permitted.
    #[error("invalid ticket status transition for {ticket_id}: {from} -> {to}")]
    InvalidStatusTransition {
        /// Ticket being transitioned.
        ticket_id: TicketId,
        /// Current status.
        from: TicketStatus,
        /// Requested status.
        to: TicketStatus,
    },
}

/// Error returned while parsing ticket statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown ticket status: {0}")]
pub struct ParseTicketStatusError(pub String);
