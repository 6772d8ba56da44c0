//! `PostgreSQL` repository implementation for ticket storage.

use super::{models::TicketRow, schema::tickets};
use crate::identity::domain::UserId;
use crate::persistence::{BlockingError, DEFAULT_REQUEST_TIMEOUT, PgPool, run_blocking};
use crate::ticket::{
    domain::{FinancialStatus, PersistedTicketData, Ticket, TicketId, TicketStatus},
    ports::{TicketRepository, TicketRepositoryError, TicketRepositoryResult},
};
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::time::Duration;

/// `PostgreSQL`-backed ticket repository.
#[derive(Debug, Clone)]
pub struct PostgresTicketRepository {
    pool: PgPool,
    timeout: Duration,
}

impl PostgresTicketRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self {
            pool,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Overrides the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl From<BlockingError> for TicketRepositoryError {
    fn from(err: BlockingError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl TicketRepository for PostgresTicketRepository {
    async fn store(&self, ticket: &Ticket) -> TicketRepositoryResult<()> {
        let ticket_id = ticket.id();
        let row = to_row(ticket);
        run_blocking(&self.pool, self.timeout, move |connection| {
            diesel::insert_into(tickets::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TicketRepositoryError::DuplicateTicket(ticket_id)
                    }
                    _ => TicketRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, ticket: &Ticket) -> TicketRepositoryResult<()> {
        let ticket_id = ticket.id();
        let row = to_row(ticket);
        run_blocking(&self.pool, self.timeout, move |connection| {
            let affected = diesel::update(tickets::table.filter(tickets::id.eq(row.id)))
                .set(&row)
                .execute(connection)
                .map_err(TicketRepositoryError::persistence)?;
            if affected == 0 {
                return Err(TicketRepositoryError::NotFound(ticket_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TicketId) -> TicketRepositoryResult<Option<Ticket>> {
        run_blocking(&self.pool, self.timeout, move |connection| {
            let row = tickets::table
                .filter(tickets::id.eq(id.into_inner()))
                .select(TicketRow::as_select())
                .first::<TicketRow>(connection)
                .optional()
                .map_err(TicketRepositoryError::persistence)?;
            row.map(row_to_ticket).transpose()
        })
        .await
    }

    async fn find_created_by(&self, user: UserId) -> TicketRepositoryResult<Vec<Ticket>> {
        run_blocking(&self.pool, self.timeout, move |connection| {
            let rows = tickets::table
                .filter(tickets::created_by.eq(user.into_inner()))
                .order(tickets::created_at.desc())
                .select(TicketRow::as_select())
                .load::<TicketRow>(connection)
                .map_err(TicketRepositoryError::persistence)?;
            rows.into_iter().map(row_to_ticket).collect()
        })
        .await
    }
}

fn to_row(ticket: &Ticket) -> TicketRow {
    TicketRow {
        id: ticket.id().into_inner(),
        title: ticket.title().to_owned(),
        description: ticket.description().to_owned(),
        status: ticket.status().as_str().to_owned(),
        financial_status: ticket.financial_status().as_str().to_owned(),
        created_by: ticket.created_by().into_inner(),
        created_at: ticket.created_at(),
        updated_at: ticket.updated_at(),
    }
}

fn row_to_ticket(row: TicketRow) -> TicketRepositoryResult<Ticket> {
    let status =
        TicketStatus::try_from(row.status.as_str()).map_err(TicketRepositoryError::persistence)?;
    let financial_status = FinancialStatus::try_from(row.financial_status.as_str())
        .map_err(TicketRepositoryError::persistence)?;
    Ok(Ticket::from_persisted(PersistedTicketData {
        id: TicketId::from_uuid(row.id),
        title: row.title,
        description: row.description,
        status,
        financial_status,
        created_by: UserId::from_uuid(row.created_by),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}
