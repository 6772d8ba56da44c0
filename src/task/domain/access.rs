//! Role rules for acting on tasks.

use super::{Task, TaskKind};
use crate::identity::domain::{Actor, Role};

/// Returns `true` when `actor` is an admin, the creator or an assignee of
/// `task`.
#[must_use]
pub fn has_access(actor: &Actor, task: &Task) -> bool {
    actor.role() == Role::Admin || task.created_by() == actor.id() || task.is_assigned(actor.id())
}

/// Returns `true` when `actor` may mutate `task`: privileged roles act on
/// any task, everyone else needs [`has_access`].
#[must_use]
pub fn may_act_on(actor: &Actor, task: &Task) -> bool {
    actor.role().is_privileged() || has_access(actor, task)
}

/// Returns `true` when `role` may create aggregates of `kind`.
#[must_use]
pub const fn may_create(role: Role, kind: TaskKind) -> bool {
    match kind {
        TaskKind::Task => matches!(
            role,
            Role::Admin | Role::ProjectManager | Role::GroupLeader
        ),
        TaskKind::TestTask => matches!(
            role,
            Role::Admin | Role::ProjectManager | Role::ResponsibleTester
        ),
    }
}
