//! `PostgreSQL` notification adapter.

mod models;
pub(crate) mod schema;
mod service;

pub use service::PostgresNotificationService;
