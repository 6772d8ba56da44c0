//! In-memory adapters for identity lookups.

mod user;

pub use user::InMemoryUserRepository;
