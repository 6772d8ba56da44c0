//! In-memory notification adapter.

mod service;

pub use service::InMemoryNotificationService;
