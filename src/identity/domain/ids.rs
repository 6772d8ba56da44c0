//! Identifier and validated scalar types for the identity domain.

use super::IdentityDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random user identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a user identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<Uuid> for UserId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalised `@handle` used to mention a user in free text.
///
/// Handles are stored lowercase and may contain ASCII letters, digits,
/// underscores, hyphens and dots. A trailing dot is not part of a handle so
/// that sentence punctuation after a mention is ignored.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MentionHandle(String);

impl MentionHandle {
    /// Creates a validated mention handle.
    ///
    /// A leading `@` is accepted and stripped.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityDomainError::InvalidMentionHandle`] when the value is
    /// empty or contains characters outside the handle alphabet.
    pub fn new(value: impl Into<String>) -> Result<Self, IdentityDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        let without_prefix = trimmed.strip_prefix('@').unwrap_or(trimmed);
        let normalized = without_prefix.trim_end_matches('.');
        let is_valid = !normalized.is_empty() && normalized.chars().all(is_handle_char);
        if !is_valid {
            return Err(IdentityDomainError::InvalidMentionHandle(raw));
        }
        Ok(Self(normalized.to_ascii_lowercase()))
    }

    /// Returns the handle without the `@` prefix.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Returns `true` for characters permitted inside a mention handle.
#[must_use]
pub const fn is_handle_char(character: char) -> bool {
    character.is_ascii_alphanumeric() || matches!(character, '_' | '-' | '.')
}

impl AsRef<str> for MentionHandle {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for MentionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}
