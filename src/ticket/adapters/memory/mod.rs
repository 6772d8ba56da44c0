//! In-memory adapters for ticket persistence.

mod ticket;

pub use ticket::InMemoryTicketRepository;
