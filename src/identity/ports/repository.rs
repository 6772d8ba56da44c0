//! Repository port for user persistence and hierarchy lookups.

use crate::identity::domain::{Hierarchy, MentionHandle, Role, User, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for user repository operations.
pub type UserRepositoryResult<T> = Result<T, UserRepositoryError>;

/// User persistence contract.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores a new user.
    ///
    /// # Errors
    ///
    /// Returns [`UserRepositoryError::DuplicateUser`] when the identifier
    /// exists or [`UserRepositoryError::DuplicateHandle`] when the mention
    /// handle is taken.
    async fn store(&self, user: &User) -> UserRepositoryResult<()>;

    /// Finds a user by identifier.
    async fn find_by_id(&self, id: UserId) -> UserRepositoryResult<Option<User>>;

    /// Returns the users matching the given identifiers; unknown identifiers
    /// are ignored.
    async fn find_by_ids(&self, ids: &[UserId]) -> UserRepositoryResult<Vec<User>>;

    /// Returns all users holding `role`.
    async fn find_by_role(&self, role: Role) -> UserRepositoryResult<Vec<User>>;

    /// Returns all users whose `relation` back-reference equals `manager`.
    async fn find_reports(
        &self,
        relation: Hierarchy,
        manager: UserId,
    ) -> UserRepositoryResult<Vec<User>>;

    /// Returns the users owning the given mention handles.
    async fn find_by_mention_handles(
        &self,
        handles: &[MentionHandle],
    ) -> UserRepositoryResult<Vec<User>>;
}

/// Errors returned by user repository implementations.
#[derive(Debug, Clone, Error)]
pub enum UserRepositoryError {
    /// A user with the same identifier already exists.
    #[error("duplicate user identifier: {0}")]
    DuplicateUser(UserId),

    /// Another user already owns the mention handle.
    #[error("duplicate mention handle: {0}")]
    DuplicateHandle(MentionHandle),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl UserRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
