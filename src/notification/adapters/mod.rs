//! Adapter implementations of the notification port.

pub mod memory;
pub mod postgres;
