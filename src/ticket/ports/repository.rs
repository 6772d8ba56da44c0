//! Repository port for ticket persistence.

use crate::identity::domain::UserId;
use crate::ticket::domain::{Ticket, TicketId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for ticket repository operations.
pub type TicketRepositoryResult<T> = Result<T, TicketRepositoryError>;

/// Ticket persistence contract.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Stores a new ticket.
    ///
    /// # Errors
    ///
    /// Returns [`TicketRepositoryError::DuplicateTicket`] when the identifier
    /// already exists.
    async fn store(&self, ticket: &Ticket) -> TicketRepositoryResult<()>;

    /// Persists changes to an existing ticket.
    ///
    /// # Errors
    ///
    /// Returns [`TicketRepositoryError::NotFound`] when the ticket does not
    /// exist.
    async fn update(&self, ticket: &Ticket) -> TicketRepositoryResult<()>;

    /// Finds a ticket by identifier.
    async fn find_by_id(&self, id: TicketId) -> TicketRepositoryResult<Option<Ticket>>;

    /// Returns all tickets opened by `user`, newest first.
    async fn find_created_by(&self, user: UserId) -> TicketRepositoryResult<Vec<Ticket>>;
}

/// Errors returned by ticket repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TicketRepositoryError {
    /// A ticket with the same identifier already exists.
    #[error("duplicate ticket identifier: {0}")]
    DuplicateTicket(TicketId),

    /// The ticket was not found.
    #[error("ticket not found: {0}")]
    NotFound(TicketId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TicketRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
