//! Closed role enumeration and the hierarchy relations between roles.

use super::ParseRoleError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role carried by every user; drives all authorization decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    /// Platform administrator with unrestricted access.
    Admin,
    /// Sales agent managing client accounts.
    AgentCommercial,
    /// External client submitting tickets.
    Client,
    /// Client-side lead who oversees the client's requests.
    ResponsibleClient,
    /// Internal project manager; top of the delivery hierarchy.
    ProjectManager,
    /// Group leader reporting to a project manager.
    GroupLeader,
    /// Developer reporting to a group leader.
    Developer,
    /// Lead tester; top of the QA hierarchy.
    ResponsibleTester,
    /// Tester reporting to a responsible tester.
    Tester,
}

impl Role {
    /// All roles in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Admin,
        Self::AgentCommercial,
        Self::Client,
        Self::ResponsibleClient,
        Self::ProjectManager,
        Self::GroupLeader,
        Self::Developer,
        Self::ResponsibleTester,
        Self::Tester,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::AgentCommercial => "agentCommercial",
            Self::Client => "client",
            Self::ResponsibleClient => "responsibleClient",
            Self::ProjectManager => "projectManager",
            Self::GroupLeader => "groupLeader",
            Self::Developer => "developer",
            Self::ResponsibleTester => "responsibleTester",
            Self::Tester => "tester",
        }
    }

    /// Returns `true` for roles that act on any task without ownership or
    /// assignment.
    #[must_use]
    pub const fn is_privileged(self) -> bool {
        match self {
            Self::Admin | Self::ProjectManager | Self::ResponsibleTester => true,
            Self::AgentCommercial
            | Self::Client
            | Self::ResponsibleClient
            | Self::GroupLeader
            | Self::Developer
            | Self::Tester => false,
        }
    }

    /// Returns the hierarchy relation through which this role manages
    /// subordinates, if any.
    #[must_use]
    pub const fn manages_via(self) -> Option<Hierarchy> {
        match self {
            Self::ProjectManager | Self::ResponsibleClient => Some(Hierarchy::ProjectManager),
            Self::GroupLeader => Some(Hierarchy::GroupLeader),
            Self::ResponsibleTester => Some(Hierarchy::ResponsibleTester),
            Self::Admin
            | Self::AgentCommercial
            | Self::Client
            | Self::Developer
            | Self::Tester => None,
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = ParseRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim();
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| ParseRoleError(value.to_owned()))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Back-reference relation on a user record pointing at their manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hierarchy {
    /// `user.project_manager` (group leaders under a project manager).
    ProjectManager,
    /// `user.group_leader` (developers under a group leader).
    GroupLeader,
    /// `user.responsible_tester` (testers under a responsible tester).
    ResponsibleTester,
}

impl Hierarchy {
    /// Returns the storage column name for the relation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProjectManager => "project_manager",
            Self::GroupLeader => "group_leader",
            Self::ResponsibleTester => "responsible_tester",
        }
    }
}
