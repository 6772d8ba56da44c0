//! Port contracts for identity lookups.
//!
//! Ports define infrastructure-agnostic interfaces used by the task and
//! notification services.

pub mod repository;

pub use repository::{UserRepository, UserRepositoryError, UserRepositoryResult};
