//! Port contracts for ticket persistence.

pub mod repository;

pub use repository::{TicketRepository, TicketRepositoryError, TicketRepositoryResult};
