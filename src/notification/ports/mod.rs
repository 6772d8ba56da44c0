//! Port contracts for notification delivery.

pub mod service;

pub use service::{NotificationError, NotificationResult, NotificationService};
