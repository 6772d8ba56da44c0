//! Ticketflow: role-based ticket, task and test-task tracking.
//!
//! Clients raise tickets, staff turn them into tasks and sub-tasks, and a
//! parallel test-task workflow tracks QA verification. Every status change
//! flows through one state machine that records history, derives timestamps
//! and fans out notifications.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal principles:
//!
//! - **Domain**: aggregates and value types with no infrastructure
//!   dependencies
//! - **Ports**: async traits the services depend on
//! - **Adapters**: in-memory and `PostgreSQL` implementations of the ports
//!
//! # Modules
//!
//! - [`identity`]: users, roles and the reporting hierarchy
//! - [`ticket`]: client tickets and their lifecycle
//! - [`task`]: the task workflow, blockers, comments, scoping and the
//!   expiry sweeper
//! - [`notification`]: rendered in-app notifications
//! - [`config`] and [`telemetry`]: runtime settings and logging

pub mod clock;
pub mod config;
pub mod identity;
pub mod notification;
pub mod persistence;
pub mod task;
pub mod telemetry;
pub mod ticket;
