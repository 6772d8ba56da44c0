//! Task workflow orchestration: creation, status changes, updates and
//! listing.

use super::{
    CreateTaskRequest, MissingEntity, StatusNotifier, TaskAccessGuard, TaskPatch,
    TaskScopeResolver, TaskServiceError, TaskServiceResult, TaskView, UploadedFile,
    WorkflowPolicy, requests::AssigneeInput,
};
use crate::identity::{
    domain::{Actor, Role, User, UserId},
    ports::UserRepository,
};
use crate::notification::{domain::RelatedEntity, ports::NotificationService};
use crate::task::{
    domain::{
        NewTask, PerformedBy, Priority, ScopeFilter, StatusTransition, Task, TaskChanges,
        TaskDomainError, TaskId, TaskKind, TaskNumber, TaskPredicate, TaskStatus, may_act_on,
        may_create,
    },
    ports::TaskRepository,
};
use crate::ticket::{domain::TicketId, ports::TicketRepository};
use mockable::Clock;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Application service driving the task and test task workflow.
pub struct TaskWorkflowService<R, U, T, N, C> {
    pub(super) tasks: Arc<R>,
    pub(super) users: Arc<U>,
    pub(super) tickets: Arc<T>,
    pub(super) notifications: Arc<N>,
    pub(super) clock: Arc<C>,
    pub(super) notifier: StatusNotifier<U, N>,
    pub(super) guard: TaskAccessGuard<R>,
    pub(super) scope: TaskScopeResolver<U>,
}

impl<R, U, T, N, C> Clone for TaskWorkflowService<R, U, T, N, C> {
    fn clone(&self) -> Self {
        Self {
            tasks: Arc::clone(&self.tasks),
            users: Arc::clone(&self.users),
            tickets: Arc::clone(&self.tickets),
            notifications: Arc::clone(&self.notifications),
            clock: Arc::clone(&self.clock),
            notifier: self.notifier.clone(),
            guard: self.guard.clone(),
            scope: self.scope.clone(),
        }
    }
}

impl<R, U, T, N, C> TaskWorkflowService<R, U, T, N, C>
where
    R: TaskRepository,
    U: UserRepository,
    T: TicketRepository,
    N: NotificationService,
    C: Clock + Send + Sync,
{
    /// Creates a workflow service.
    #[must_use]
    pub fn new(
        tasks: Arc<R>,
        users: Arc<U>,
        tickets: Arc<T>,
        notifications: Arc<N>,
        clock: Arc<C>,
        policy: WorkflowPolicy,
    ) -> Self {
        Self {
            notifier: StatusNotifier::new(Arc::clone(&users), Arc::clone(&notifications)),
            guard: TaskAccessGuard::new(Arc::clone(&tasks)),
            scope: TaskScopeResolver::new(Arc::clone(&users), policy.tester_visibility),
            tasks,
            users,
            tickets,
            notifications,
            clock,
        }
    }

    /// Returns the access guard.
    #[must_use]
    pub const fn guard(&self) -> &TaskAccessGuard<R> {
        &self.guard
    }

    /// Returns the role scope resolver.
    #[must_use]
    pub const fn scope(&self) -> &TaskScopeResolver<U> {
        &self.scope
    }

    /// Creates a task or test task.
    ///
    /// The number is allocated from the per-kind daily sequence. Assignees
    /// are notified individually and users mentioned in the description are
    /// recorded as task-level mentions and notified.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Authorization`] when the role may not
    /// create the kind, [`TaskServiceError::NotFound`] for an unknown ticket,
    /// parent or assignee, or [`TaskServiceError::Validation`] for invalid
    /// fields or an unsuitable parent.
    #[instrument(skip(self, request), fields(actor = %actor.id()))]
    pub async fn create_task(
        &self,
        actor: &Actor,
        request: CreateTaskRequest,
    ) -> TaskServiceResult<Task> {
        let parts = request.into_parts();
        if !may_create(actor.role(), parts.kind) {
            return Err(TaskServiceError::forbidden(
                actor.role(),
                "create this kind of task",
            ));
        }
        let priority = parts
            .priority
            .map(Priority::new)
            .transpose()?
            .unwrap_or_default();
        if let Some(ticket_id) = parts.ticket {
            self.ensure_ticket_exists(ticket_id).await?;
        }
        let parent = match parts.parent_task {
            Some(parent_id) => Some(self.load_parent(parent_id, parts.kind).await?),
            None => None,
        };
        self.ensure_users_exist(&parts.assigned_to).await?;

        let number = self.allocate_number(parts.kind).await?;
        let assignees: Vec<UserId> = parts.assigned_to.iter().copied().collect();
        let mut task = Task::create(
            NewTask {
                kind: parts.kind,
                number,
                name: parts.name,
                description: parts.description,
                urgency: parts.urgency,
                priority,
                created_by: actor.id(),
                assigned_to: parts.assigned_to,
                ticket: parts.ticket,
                parent_task: parts.parent_task,
                due_date: parts.due_date,
                estimated_hours: parts.estimated_hours,
            },
            &*self.clock,
        )?;
        let mentioned = self.resolve_mentions(task.description()).await;
        task.add_mentions(mentioned);
        self.tasks.store(&task).await?;
        info!(task_id = %task.id(), number = %task.number(), kind = %task.kind(), "task created");

        if let Some(mut parent_task) = parent {
            parent_task.add_subtask(task.id(), &*self.clock)?;
            self.tasks.update(&parent_task).await?;
        }

        let author = self.display_name(actor.id()).await;
        for assignee in assignees {
            self.notify_assignment(&task, assignee, &author).await;
        }
        self.notify_task_mentions(&mut task, &author).await;
        Ok(task)
    }

    /// Returns a task with its referenced display names.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] or
    /// [`TaskServiceError::Authorization`].
    pub async fn get_task(&self, actor: &Actor, id: TaskId) -> TaskServiceResult<TaskView> {
        let task = self.load(id).await?;
        Self::authorize(actor, &task, "view this task")?;
        TaskView::resolve(task, &*self.users).await
    }

    /// Returns a task by its human-readable number.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Validation`] for a malformed number,
    /// [`TaskServiceError::NotFound`] or [`TaskServiceError::Authorization`].
    pub async fn get_task_by_number(
        &self,
        actor: &Actor,
        number: &str,
    ) -> TaskServiceResult<TaskView> {
        let parsed = TaskNumber::parse(number)?;
        let Some(task) = self.tasks.find_by_number(&parsed).await? else {
            return Err(TaskServiceError::NotFound(MissingEntity::Number(parsed)));
        };
        Self::authorize(actor, &task, "view this task")?;
        TaskView::resolve(task, &*self.users).await
    }

    /// Sets the status of a task.
    ///
    /// Setting the current status is a no-op. Leaving a terminal status is
    /// reserved to privileged roles and recorded as a reopen.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`],
    /// [`TaskServiceError::Authorization`] or a persistence error.
    #[instrument(skip(self, reason), fields(actor = %actor.id()))]
    pub async fn change_status(
        &self,
        actor: &Actor,
        id: TaskId,
        target: TaskStatus,
        reason: Option<String>,
    ) -> TaskServiceResult<Task> {
        let mut task = self.load(id).await?;
        Self::authorize(actor, &task, "change the status of this task")?;
        Self::ensure_may_leave(actor, &task, target)?;
        let note = reason.clone();
        let Some(transition) = task.change_status(
            target,
            PerformedBy::User(actor.id()),
            reason,
            &*self.clock,
        ) else {
            debug!(task_id = %id, status = %target, "status unchanged");
            return Ok(task);
        };
        self.tasks.update(&task).await?;
        self.after_transition(&task, transition, actor, note.as_deref())
            .await;
        Ok(task)
    }

    /// Applies a partial update.
    ///
    /// Field changes are recorded in one `updated` entry; a status in the
    /// patch is applied afterwards through the state machine.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`],
    /// [`TaskServiceError::Authorization`] or
    /// [`TaskServiceError::Validation`].
    #[instrument(skip(self, patch), fields(actor = %actor.id()))]
    pub async fn update_task(
        &self,
        actor: &Actor,
        id: TaskId,
        patch: TaskPatch,
    ) -> TaskServiceResult<Task> {
        let mut task = self.load(id).await?;
        Self::authorize(actor, &task, "update this task")?;
        if let Some(target) = patch.status {
            Self::ensure_may_leave(actor, &task, target)?;
        }
        let changes = TaskChanges {
            name: patch.name,
            description: patch.description,
            urgency: patch.urgency,
            priority: patch.priority.map(Priority::new).transpose()?,
            due_date: patch.due_date,
            estimated_hours: patch.estimated_hours,
        };
        let fields = task.apply_changes(changes, actor.id(), &*self.clock)?;
        let transition = patch.status.and_then(|target| {
            task.change_status(target, PerformedBy::User(actor.id()), None, &*self.clock)
        });
        if fields.is_empty() && transition.is_none() {
            return Ok(task);
        }
        self.tasks.update(&task).await?;
        if !fields.is_empty() {
            info!(task_id = %id, ?fields, "task updated");
        }
        if let Some(changed) = transition {
            self.after_transition(&task, changed, actor, None).await;
        }
        Ok(task)
    }

    /// Adds users to a task and notifies those newly assigned.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] for an unknown task or user,
    /// or [`TaskServiceError::Authorization`].
    #[instrument(skip(self, assignees), fields(actor = %actor.id()))]
    pub async fn assign_users(
        &self,
        actor: &Actor,
        id: TaskId,
        assignees: AssigneeInput,
    ) -> TaskServiceResult<Task> {
        let mut task = self.load(id).await?;
        Self::authorize(actor, &task, "assign users to this task")?;
        let requested = assignees.into_set();
        self.ensure_users_exist(&requested).await?;
        let added = task.assign(requested, actor.id(), &*self.clock);
        if added.is_empty() {
            return Ok(task);
        }
        self.tasks.update(&task).await?;
        info!(task_id = %id, added = added.len(), "users assigned");
        let assigner = self.display_name(actor.id()).await;
        for assignee in added {
            self.notify_assignment(&task, assignee, &assigner).await;
        }
        Ok(task)
    }

    /// Records an attachment already handed to file storage.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`],
    /// [`TaskServiceError::Authorization`] or
    /// [`TaskServiceError::Validation`].
    pub async fn add_attachment(
        &self,
        actor: &Actor,
        id: TaskId,
        file: UploadedFile,
    ) -> TaskServiceResult<Task> {
        let mut task = self.load(id).await?;
        Self::authorize(actor, &task, "attach files to this task")?;
        task.add_attachment(
            file.original_name(),
            file.storage_ref(),
            actor.id(),
            &*self.clock,
        )?;
        self.tasks.update(&task).await?;
        Ok(task)
    }

    /// Records a verification result on a task in testing.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Authorization`] for roles outside QA and
    /// management, [`TaskServiceError::NotFound`], or
    /// [`TaskServiceError::Validation`] when the task is not in testing.
    #[instrument(skip(self, notes), fields(actor = %actor.id()))]
    pub async fn record_test_result(
        &self,
        actor: &Actor,
        id: TaskId,
        passed: bool,
        notes: Option<String>,
    ) -> TaskServiceResult<Task> {
        let may_test = matches!(
            actor.role(),
            Role::Admin | Role::ProjectManager | Role::ResponsibleTester | Role::Tester
        );
        if !may_test {
            return Err(TaskServiceError::forbidden(actor.role(), "record test results"));
        }
        let mut task = self.load(id).await?;
        Self::authorize(actor, &task, "record test results on this task")?;
        let note = notes.clone();
        let transition = task.record_test_result(passed, notes, actor.id(), &*self.clock)?;
        self.tasks.update(&task).await?;
        self.after_transition(&task, transition, actor, note.as_deref())
            .await;
        Ok(task)
    }

    /// Lists the tasks visible to `actor`, optionally narrowed by `extra`.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when the scope or the tasks cannot be
    /// loaded.
    pub async fn list_tasks(
        &self,
        actor: &Actor,
        filter: Option<ScopeFilter>,
        extra: Option<TaskPredicate>,
    ) -> TaskServiceResult<Vec<Task>> {
        let scoped = self.scope.build_scoped_query(actor, filter).await?;
        let predicate = extra.into_iter().fold(scoped, TaskPredicate::and);
        Ok(self.tasks.find_matching(&predicate).await?)
    }

    /// Lists the test tasks in testing visible to `actor`.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when the scope or the tasks cannot be
    /// loaded.
    pub async fn list_testing(&self, actor: &Actor) -> TaskServiceResult<Vec<Task>> {
        self.list_tasks(
            actor,
            None,
            Some(TaskPredicate::And(vec![
                TaskPredicate::KindIs(TaskKind::TestTask),
                TaskPredicate::StatusIs(TaskStatus::Testing),
            ])),
        )
        .await
    }

    /// Returns whether the user may act on the task as its admin, creator
    /// or assignee.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when the task cannot be loaded.
    pub async fn has_access(
        &self,
        user: UserId,
        role: Role,
        id: TaskId,
    ) -> TaskServiceResult<bool> {
        self.guard.has_access(user, role, id).await
    }

    pub(super) async fn load(&self, id: TaskId) -> TaskServiceResult<Task> {
        self.tasks
            .find_by_id(id)
            .await?
            .ok_or(TaskServiceError::NotFound(MissingEntity::Task(id)))
    }

    pub(super) fn authorize(
        actor: &Actor,
        task: &Task,
        operation: &'static str,
    ) -> TaskServiceResult<()> {
        if may_act_on(actor, task) {
            return Ok(());
        }
        Err(TaskServiceError::forbidden(actor.role(), operation))
    }

    pub(super) fn ensure_may_leave(
        actor: &Actor,
        task: &Task,
        target: TaskStatus,
    ) -> TaskServiceResult<()> {
        let reopens = task.status().is_terminal() && task.status() != target;
        if reopens && !actor.role().is_privileged() {
            return Err(TaskServiceError::forbidden(actor.role(), "reopen an archived task"));
        }
        Ok(())
    }

    pub(super) async fn after_transition(
        &self,
        task: &Task,
        transition: StatusTransition,
        actor: &Actor,
        reason: Option<&str>,
    ) {
        info!(
            task_id = %task.id(),
            number = %task.number(),
            from = %transition.previous,
            status = %transition.current,
            reopened = transition.reopened,
            "task status changed"
        );
        self.notifier
            .announce(task, transition, PerformedBy::User(actor.id()), reason)
            .await;
    }

    pub(super) async fn display_name(&self, user: UserId) -> String {
        match self.users.find_by_id(user).await {
            Ok(Some(found)) => found.display_name().to_owned(),
            Ok(None) => user.to_string(),
            Err(err) => {
                warn!(user = %user, error = %err, "display name lookup failed");
                user.to_string()
            }
        }
    }

    async fn allocate_number(&self, kind: TaskKind) -> TaskServiceResult<TaskNumber> {
        let day = self.clock.utc().date_naive();
        let sequence = self.tasks.next_number_sequence(kind, day).await?;
        Ok(TaskNumber::compose(kind, day, sequence))
    }

    async fn ensure_ticket_exists(&self, id: TicketId) -> TaskServiceResult<()> {
        if self.tickets.find_by_id(id).await?.is_none() {
            return Err(TaskServiceError::NotFound(MissingEntity::Ticket(id)));
        }
        Ok(())
    }

    async fn load_parent(&self, id: TaskId, child_kind: TaskKind) -> TaskServiceResult<Task> {
        let parent = self.load(id).await?;
        if !parent.accepts_subtask_of_kind(child_kind) {
            return Err(TaskDomainError::InvalidParent(id).into());
        }
        Ok(parent)
    }

    async fn ensure_users_exist(&self, users: &BTreeSet<UserId>) -> TaskServiceResult<()> {
        if users.is_empty() {
            return Ok(());
        }
        let wanted: Vec<UserId> = users.iter().copied().collect();
        let found: BTreeSet<UserId> = self
            .users
            .find_by_ids(&wanted)
            .await?
            .iter()
            .map(User::id)
            .collect();
        match wanted.into_iter().find(|user| !found.contains(user)) {
            Some(missing) => Err(TaskServiceError::NotFound(MissingEntity::User(missing))),
            None => Ok(()),
        }
    }

    pub(super) async fn resolve_mentions(&self, text: &str) -> Vec<UserId> {
        match self.notifications.extract_mentions(text).await {
            Ok(users) => users,
            Err(err) => {
                warn!(error = %err, "mention resolution failed");
                Vec::new()
            }
        }
    }

    async fn notify_assignment(&self, task: &Task, assignee: UserId, assigner: &str) {
        let outcome = self
            .notifications
            .notify_task_assignment(assignee, task.id().into_inner(), task.name(), assigner)
            .await;
        if let Err(err) = outcome {
            warn!(
                task_id = %task.id(),
                assignee = %assignee,
                error = %err,
                "assignment notification failed"
            );
        }
    }

    async fn notify_task_mentions(&self, task: &mut Task, author: &str) {
        if task.mentions().is_empty() {
            return;
        }
        let related = RelatedEntity::task(task.id().into_inner());
        let notified = match self
            .notifications
            .process_mentions(task.description(), author, related)
            .await
        {
            Ok(users) => users,
            Err(err) => {
                warn!(task_id = %task.id(), error = %err, "mention notification failed");
                return;
            }
        };
        task.mark_mentions_notified(&notified);
        if let Err(err) = self.tasks.update(task).await {
            warn!(task_id = %task.id(), error = %err, "failed to record notified mentions");
        }
    }
}
