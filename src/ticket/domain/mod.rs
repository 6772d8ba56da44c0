//! Domain model for client tickets.

mod error;
mod ids;
mod ticket;

pub use error::{ParseTicketStatusError, TicketDomainError};
pub use ids::TicketId;
pub use ticket::{FinancialStatus, PersistedTicketData, Ticket, TicketStatus};
