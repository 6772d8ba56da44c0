//! Service layer for opening and progressing client tickets.

use crate::identity::domain::{Actor, Role};
use crate::ticket::{
    domain::{FinancialStatus, Ticket, TicketDomainError, TicketId, TicketStatus},
    ports::{TicketRepository, TicketRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument};

/// Request payload for opening a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTicketRequest {
    title: String,
    description: String,
}

impl OpenTicketRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Service-level errors for ticket operations.
#[derive(Debug, Error)]
pub enum TicketServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TicketDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TicketRepositoryError),
    /// The ticket does not exist or is not visible to the actor.
    #[error("ticket {0} not found")]
    NotFound(TicketId),
    /// The actor's role does not permit the operation.
    #[error("role {role} may not {operation}")]
    Forbidden {
        /// Acting role.
        role: Role,
        /// Attempted operation.
        operation: &'static str,
    },
}

/// Result type for ticket service operations.
pub type TicketServiceResult<T> = Result<T, TicketServiceError>;

/// Ticket lifecycle orchestration service.
#[derive(Clone)]
pub struct TicketService<R, C>
where
    R: TicketRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> TicketService<R, C>
where
    R: TicketRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new ticket service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Opens a ticket on behalf of `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`TicketServiceError::Forbidden`] for roles that do not submit
    /// tickets, domain errors for invalid input, or repository errors.
    #[instrument(skip(self, request), fields(actor = %actor.id()))]
    pub async fn open_ticket(
        &self,
        actor: &Actor,
        request: OpenTicketRequest,
    ) -> TicketServiceResult<Ticket> {
        let may_open = matches!(
            actor.role(),
            Role::Admin
                | Role::Client
                | Role::ResponsibleClient
                | Role::AgentCommercial
                | Role::ProjectManager
        );
        if !may_open {
            return Err(TicketServiceError::Forbidden {
                role: actor.role(),
                operation: "open tickets",
            });
        }
        let ticket = Ticket::open(
            request.title,
            request.description,
            actor.id(),
            &*self.clock,
        )?;
        self.repository.store(&ticket).await?;
        info!(ticket_id = %ticket.id(), "ticket opened");
        Ok(ticket)
    }

    /// Returns a ticket visible to `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`TicketServiceError::NotFound`] when the ticket is missing or
    /// hidden from the actor.
    pub async fn find_for(&self, actor: &Actor, id: TicketId) -> TicketServiceResult<Ticket> {
        self.repository
            .find_by_id(id)
            .await?
            .filter(|ticket| ticket.is_accessible_by(actor))
            .ok_or(TicketServiceError::NotFound(id))
    }

    /// Moves a ticket through its lifecycle.
    ///
    /// # Errors
    ///
    /// Returns [`TicketServiceError::Forbidden`] unless the actor is an admin
    /// or project manager, [`TicketServiceError::NotFound`] for unknown
    /// tickets, or domain errors for forbidden transitions.
    #[instrument(skip(self), fields(actor = %actor.id()))]
    pub async fn transition(
        &self,
        actor: &Actor,
        id: TicketId,
        target: TicketStatus,
    ) -> TicketServiceResult<Ticket> {
        if !matches!(actor.role(), Role::Admin | Role::ProjectManager) {
            return Err(TicketServiceError::Forbidden {
                role: actor.role(),
                operation: "change ticket status",
            });
        }
        let mut ticket = self.find_for(actor, id).await?;
        ticket.transition_to(target, &*self.clock)?;
        self.repository.update(&ticket).await?;
        info!(ticket_id = %id, status = %target, "ticket status changed");
        Ok(ticket)
    }

    /// Records the billing state of a ticket.
    ///
    /// # Errors
    ///
    /// Returns [`TicketServiceError::Forbidden`] unless the actor is an admin
    /// or commercial agent, or [`TicketServiceError::NotFound`] for unknown
    /// tickets.
    pub async fn set_financial_status(
        &self,
        actor: &Actor,
        id: TicketId,
        status: FinancialStatus,
    ) -> TicketServiceResult<Ticket> {
        if !matches!(actor.role(), Role::Admin | Role::AgentCommercial) {
            return Err(TicketServiceError::Forbidden {
                role: actor.role(),
                operation: "change billing status",
            });
        }
        let mut ticket = self.find_for(actor, id).await?;
        ticket.set_financial_status(status, &*self.clock);
        self.repository.update(&ticket).await?;
        Ok(ticket)
    }
}
