//! Error types for identity domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing identity values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityDomainError {
    /// The display name is empty after trimming.
    #[error("user display name must not be empty")]
    EmptyDisplayName,

    /// The mention handle is empty or contains unsupported characters.
    #[error("invalid mention handle '{0}'")]
    InvalidMentionHandle(String),
}

/// Error returned while parsing roles from persistence or session input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);
