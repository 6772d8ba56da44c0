//! `PostgreSQL` adapters for identity lookups.

mod models;
mod repository;
pub(crate) mod schema;

pub use repository::PostgresUserRepository;
