//! Tasks and test tasks: the workflow state machine, blockers, comments
//! with mentions, role-scoped listing and the scheduled expiry sweep.
//!
//! Both kinds share one aggregate, [`domain::Task`], distinguished by
//! [`domain::TaskKind`]. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
