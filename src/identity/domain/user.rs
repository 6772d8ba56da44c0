//! User records and the acting identity supplied by the session layer.

use super::{Hierarchy, IdentityDomainError, MentionHandle, Role, UserId};
use serde::{Deserialize, Serialize};

/// Authenticated identity performing an operation.
///
/// The session layer resolves this before calling into the core; the core
/// trusts it as already authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    id: UserId,
    role: Role,
}

impl Actor {
    /// Creates an actor from an identifier and role.
    #[must_use]
    pub const fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    /// Returns the acting user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the acting user's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }
}

/// User account with its position in the organisation hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    display_name: String,
    mention_handle: MentionHandle,
    role: Role,
    project_manager: Option<UserId>,
    group_leader: Option<UserId>,
    responsible_tester: Option<UserId>,
}

impl User {
    /// Creates a user with no hierarchy links.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityDomainError::EmptyDisplayName`] when the display name
    /// is blank.
    pub fn new(
        display_name: impl Into<String>,
        mention_handle: MentionHandle,
        role: Role,
    ) -> Result<Self, IdentityDomainError> {
        let raw_name = display_name.into();
        let trimmed = raw_name.trim();
        if trimmed.is_empty() {
            return Err(IdentityDomainError::EmptyDisplayName);
        }
        Ok(Self {
            id: UserId::new(),
            display_name: trimmed.to_owned(),
            mention_handle,
            role,
            project_manager: None,
            group_leader: None,
            responsible_tester: None,
        })
    }

    /// Replaces the generated identifier, used when rehydrating from storage.
    #[must_use]
    pub const fn with_id(mut self, id: UserId) -> Self {
        self.id = id;
        self
    }

    /// Links the user to a manager through the given hierarchy relation.
    #[must_use]
    pub const fn reporting_to(mut self, relation: Hierarchy, manager: UserId) -> Self {
        match relation {
            Hierarchy::ProjectManager => self.project_manager = Some(manager),
            Hierarchy::GroupLeader => self.group_leader = Some(manager),
            Hierarchy::ResponsibleTester => self.responsible_tester = Some(manager),
        }
        self
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the mention handle.
    #[must_use]
    pub const fn mention_handle(&self) -> &MentionHandle {
        &self.mention_handle
    }

    /// Returns the user's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns the manager linked through `relation`, if any.
    #[must_use]
    pub const fn manager(&self, relation: Hierarchy) -> Option<UserId> {
        match relation {
            Hierarchy::ProjectManager => self.project_manager,
            Hierarchy::GroupLeader => self.group_leader,
            Hierarchy::ResponsibleTester => self.responsible_tester,
        }
    }

    /// Returns the acting identity for this user.
    #[must_use]
    pub const fn actor(&self) -> Actor {
        Actor::new(self.id, self.role)
    }
}
