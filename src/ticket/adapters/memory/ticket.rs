//! In-memory ticket repository for tests and embedded use.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::identity::domain::UserId;
use crate::ticket::{
    domain::{Ticket, TicketId},
    ports::{TicketRepository, TicketRepositoryError, TicketRepositoryResult},
};

/// Thread-safe in-memory ticket repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTicketRepository {
    tickets: Arc<RwLock<HashMap<TicketId, Ticket>>>,
}

impl InMemoryTicketRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl ToString) -> TicketRepositoryError {
    TicketRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TicketRepository for InMemoryTicketRepository {
    async fn store(&self, ticket: &Ticket) -> TicketRepositoryResult<()> {
        let mut tickets = self.tickets.write().map_err(lock_error)?;
        if tickets.contains_key(&ticket.id()) {
            return Err(TicketRepositoryError::DuplicateTicket(ticket.id()));
        }
        tickets.insert(ticket.id(), ticket.clone());
        Ok(())
    }

    async fn update(&self, ticket: &Ticket) -> TicketRepositoryResult<()> {
        let mut tickets = self.tickets.write().map_err(lock_error)?;
        let slot = tickets
            .get_mut(&ticket.id())
            .ok_or(TicketRepositoryError::NotFound(ticket.id()))?;
        *slot = ticket.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: TicketId) -> TicketRepositoryResult<Option<Ticket>> {
        let tickets = self.tickets.read().map_err(lock_error)?;
        Ok(tickets.get(&id).cloned())
    }

    async fn find_created_by(&self, user: UserId) -> TicketRepositoryResult<Vec<Ticket>> {
        let tickets = self.tickets.read().map_err(lock_error)?;
        let mut owned: Vec<Ticket> = tickets
            .values()
            .filter(|ticket| ticket.created_by() == user)
            .cloned()
            .collect();
        owned.sort_by_key(|ticket| std::cmp::Reverse(ticket.created_at()));
        Ok(owned)
    }
}
