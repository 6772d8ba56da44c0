//! Read model pairing a task with the display names it references.

use crate::identity::{domain::UserId, ports::UserRepository};
use crate::task::domain::Task;
use std::collections::{BTreeMap, BTreeSet};

use super::TaskServiceResult;

/// A freshly loaded task with the names of every user it references.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskView {
    task: Task,
    display_names: BTreeMap<UserId, String>,
}

impl TaskView {
    /// Resolves the display names of every user referenced by `task`.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when the user lookup fails.
    pub async fn resolve<U: UserRepository>(task: Task, users: &U) -> TaskServiceResult<Self> {
        let referenced: Vec<UserId> = referenced_users(&task).into_iter().collect();
        let display_names = users
            .find_by_ids(&referenced)
            .await?
            .into_iter()
            .map(|user| (user.id(), user.display_name().to_owned()))
            .collect();
        Ok(Self {
            task,
            display_names,
        })
    }

    /// Returns the task.
    #[must_use]
    pub const fn task(&self) -> &Task {
        &self.task
    }

    /// Consumes the view, returning the task.
    #[must_use]
    pub fn into_task(self) -> Task {
        self.task
    }

    /// Returns the display name of `user`, if known.
    #[must_use]
    pub fn display_name(&self, user: UserId) -> Option<&str> {
        self.display_names.get(&user).map(String::as_str)
    }
}

fn referenced_users(task: &Task) -> BTreeSet<UserId> {
    let mut users = BTreeSet::from([task.created_by()]);
    users.extend(task.assigned_to().iter().copied());
    users.extend(task.mentions().iter().map(|mention| mention.user));
    for comment in task.comments() {
        users.insert(comment.author);
        users.extend(comment.mentions.iter().map(|mention| mention.user));
    }
    for blocker in task.blockers() {
        users.insert(blocker.created_by);
        users.extend(blocker.resolved_by);
    }
    users.extend(task.attachments().iter().map(|attachment| attachment.uploaded_by));
    users
}
