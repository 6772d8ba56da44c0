//! Client tickets and their status and billing lifecycle.
//!
//! Tickets are the parent records tasks may reference; the task core only
//! needs to know that a referenced ticket exists.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
