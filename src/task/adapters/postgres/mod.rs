//! `PostgreSQL` adapters for task persistence.

mod models;
mod predicate;
mod repository;
pub(crate) mod schema;

pub use repository::PostgresTaskRepository;
