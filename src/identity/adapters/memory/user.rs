//! In-memory user repository for tests and embedded use.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::identity::{
    domain::{Hierarchy, MentionHandle, Role, User, UserId},
    ports::{UserRepository, UserRepositoryError, UserRepositoryResult},
};

/// Thread-safe in-memory user repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    state: Arc<RwLock<InMemoryUserState>>,
}

#[derive(Debug, Default)]
struct InMemoryUserState {
    users: HashMap<UserId, User>,
    handle_index: HashMap<MentionHandle, UserId>,
}

impl InMemoryUserRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> UserRepositoryResult<std::sync::RwLockReadGuard<'_, InMemoryUserState>> {
        self.state.read().map_err(|err| {
            UserRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn select(
        &self,
        predicate: impl Fn(&User) -> bool,
    ) -> UserRepositoryResult<Vec<User>> {
        let state = self.read()?;
        let mut users: Vec<User> = state
            .users
            .values()
            .filter(|user| predicate(user))
            .cloned()
            .collect();
        users.sort_by_key(User::id);
        Ok(users)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn store(&self, user: &User) -> UserRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            UserRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if state.users.contains_key(&user.id()) {
            return Err(UserRepositoryError::DuplicateUser(user.id()));
        }
        let handle = user.mention_handle().clone();
        if state.handle_index.contains_key(&handle) {
            return Err(UserRepositoryError::DuplicateHandle(handle));
        }
        state.handle_index.insert(handle, user.id());
        state.users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> UserRepositoryResult<Option<User>> {
        let state = self.read()?;
        Ok(state.users.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> UserRepositoryResult<Vec<User>> {
        self.select(|user| ids.contains(&user.id()))
    }

    async fn find_by_role(&self, role: Role) -> UserRepositoryResult<Vec<User>> {
        self.select(|user| user.role() == role)
    }

    async fn find_reports(
        &self,
        relation: Hierarchy,
        manager: UserId,
    ) -> UserRepositoryResult<Vec<User>> {
        self.select(|user| user.manager(relation) == Some(manager))
    }

    async fn find_by_mention_handles(
        &self,
        handles: &[MentionHandle],
    ) -> UserRepositoryResult<Vec<User>> {
        let state = self.read()?;
        Ok(handles
            .iter()
            .filter_map(|handle| state.handle_index.get(handle))
            .filter_map(|id| state.users.get(id))
            .cloned()
            .collect())
    }
}
