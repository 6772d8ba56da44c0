//! Translates an actor's role into the set of tasks they may list.

use super::{TaskServiceResult, TesterVisibility};
use crate::identity::{
    domain::{Actor, Hierarchy, Role, User, UserId},
    ports::UserRepository,
};
use crate::task::domain::{ScopeFilter, TaskPredicate, TaskStatus};
use std::sync::Arc;
use tracing::debug;

/// Builds role-scoped task predicates.
#[derive(Debug)]
pub struct TaskScopeResolver<U> {
    users: Arc<U>,
    tester_visibility: TesterVisibility,
}

impl<U> Clone for TaskScopeResolver<U> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            tester_visibility: self.tester_visibility,
        }
    }
}

impl<U: UserRepository> TaskScopeResolver<U> {
    /// Creates a resolver backed by the user directory.
    #[must_use]
    pub const fn new(users: Arc<U>, tester_visibility: TesterVisibility) -> Self {
        Self {
            users,
            tester_visibility,
        }
    }

    /// Returns the predicate selecting the tasks `actor` may see.
    ///
    /// `filter` narrows a group leader's scope to tasks they created or
    /// that are assigned to them; other roles ignore it.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when the hierarchy lookup fails.
    pub async fn build_scoped_query(
        &self,
        actor: &Actor,
        filter: Option<ScopeFilter>,
    ) -> TaskServiceResult<TaskPredicate> {
        let me = actor.id();
        let predicate = match actor.role() {
            Role::Admin => TaskPredicate::All,
            Role::GroupLeader => match filter {
                Some(ScopeFilter::Created) => TaskPredicate::CreatedBy(me),
                Some(ScopeFilter::Assigned) => TaskPredicate::AssignedTo(me),
                None => TaskPredicate::Or(vec![
                    TaskPredicate::CreatedBy(me),
                    TaskPredicate::AssignedTo(me),
                ]),
            },
            Role::ProjectManager | Role::ResponsibleClient => {
                let leaders = self
                    .reports(Hierarchy::ProjectManager, actor, Role::GroupLeader)
                    .await?;
                TaskPredicate::Or(vec![
                    TaskPredicate::CreatedBy(me),
                    TaskPredicate::AssignedTo(me),
                    TaskPredicate::CreatedByAny(leaders),
                ])
            }
            Role::ResponsibleTester => match self.tester_visibility {
                TesterVisibility::Global => TaskPredicate::StatusIs(TaskStatus::Testing),
                TesterVisibility::Hierarchy => {
                    let testers = self
                        .reports(Hierarchy::ResponsibleTester, actor, Role::Tester)
                        .await?;
                    TaskPredicate::And(vec![
                        TaskPredicate::StatusIs(TaskStatus::Testing),
                        TaskPredicate::Or(vec![
                            TaskPredicate::CreatedBy(me),
                            TaskPredicate::AssignedTo(me),
                            TaskPredicate::AssignedToAny(testers),
                        ]),
                    ])
                }
            },
            Role::AgentCommercial | Role::Client | Role::Developer | Role::Tester => {
                TaskPredicate::AssignedTo(me)
            }
        };
        debug!(actor = %me, role = %actor.role(), ?predicate, "built task scope");
        Ok(predicate)
    }

    async fn reports(
        &self,
        relation: Hierarchy,
        actor: &Actor,
        role: Role,
    ) -> TaskServiceResult<Vec<UserId>> {
        let reports = self.users.find_reports(relation, actor.id()).await?;
        Ok(reports
            .iter()
            .filter(|user| user.role() == role)
            .map(User::id)
            .collect())
    }
}
