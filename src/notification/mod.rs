//! Notification delivery and `@mention` resolution.
//!
//! The task workflow talks to notifications only through
//! [`ports::NotificationService`]; message wording lives in
//! [`domain::NotificationTemplate`].

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
