//! Unit tests for the task context.

mod support;
mod workflow_tests;
