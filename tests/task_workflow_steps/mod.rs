//! Step definitions shared by the workflow and sweeper scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
