//! Application services for the ticket lifecycle.

mod lifecycle;

pub use lifecycle::{OpenTicketRequest, TicketService, TicketServiceError, TicketServiceResult};
