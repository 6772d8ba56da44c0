//! Users, roles and the organisation hierarchy.
//!
//! Every authorization decision in the task core is driven by the closed
//! [`domain::Role`] enumeration. Hierarchy is encoded by optional
//! back-references on each user: project manager → group leader →
//! developer, and responsible tester → tester.

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
