//! Unit tests for the ticket context.

mod domain_tests;
