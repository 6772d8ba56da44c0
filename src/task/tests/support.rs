//! Shared fixtures for task tests.

use crate::clock::ManualClock;
use crate::identity::{
    adapters::memory::InMemoryUserRepository,
    domain::{Hierarchy, MentionHandle, Role, User, UserId},
    ports::UserRepository,
};
use crate::notification::adapters::memory::InMemoryNotificationService;
use crate::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{
        NewTask, Priority, Task, TaskId, TaskKind, TaskNumber, TaskPredicate, Urgency,
    },
    ports::{TaskRepository, TaskRepositoryResult},
    services::{ExpirySweeper, TaskWorkflowService, WorkflowPolicy},
};
use crate::ticket::adapters::memory::InMemoryTicketRepository;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use mockable::Clock;
use mockall::mock;
use std::collections::BTreeSet;
use std::sync::Arc;

pub(super) type Notifications = InMemoryNotificationService<InMemoryUserRepository, ManualClock>;

pub(super) type Workflow = TaskWorkflowService<
    InMemoryTaskRepository,
    InMemoryUserRepository,
    InMemoryTicketRepository,
    Notifications,
    ManualClock,
>;

mock! {
    pub(crate) Tasks {}

    #[async_trait]
    impl TaskRepository for Tasks {
        async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;
        async fn update(&self, task: &Task) -> TaskRepositoryResult<()>;
        async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;
        async fn find_by_number(&self, number: &TaskNumber) -> TaskRepositoryResult<Option<Task>>;
        async fn find_matching(&self, predicate: &TaskPredicate) -> TaskRepositoryResult<Vec<Task>>;
        async fn next_number_sequence(
            &self,
            kind: TaskKind,
            day: NaiveDate,
        ) -> TaskRepositoryResult<u32>;
    }
}

pub(super) type Sweeper =
    ExpirySweeper<InMemoryTaskRepository, InMemoryUserRepository, Notifications, ManualClock>;

/// Monday 5 January 2026, 09:00 UTC.
pub(super) fn start_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0)
        .single()
        .expect("valid start instant")
}

/// In-memory adapters wired into the workflow service.
pub(super) struct World {
    pub(super) tasks: Arc<InMemoryTaskRepository>,
    pub(super) users: Arc<InMemoryUserRepository>,
    pub(super) tickets: Arc<InMemoryTicketRepository>,
    pub(super) notifications: Arc<Notifications>,
    pub(super) clock: ManualClock,
    pub(super) workflow: Workflow,
}

impl World {
    pub(super) fn new(policy: WorkflowPolicy) -> Self {
        let clock = ManualClock::new(start_instant());
        let tasks = Arc::new(InMemoryTaskRepository::new());
        let users = Arc::new(InMemoryUserRepository::new());
        let tickets = Arc::new(InMemoryTicketRepository::new());
        let shared_clock = Arc::new(clock.clone());
        let notifications = Arc::new(InMemoryNotificationService::new(
            Arc::clone(&users),
            Arc::clone(&shared_clock),
        ));
        let workflow = TaskWorkflowService::new(
            Arc::clone(&tasks),
            Arc::clone(&users),
            Arc::clone(&tickets),
            Arc::clone(&notifications),
            shared_clock,
            policy,
        );
        Self {
            tasks,
            users,
            tickets,
            notifications,
            clock,
            workflow,
        }
    }

    /// Builds a workflow that shares this world's collaborators but stores
    /// tasks in `tasks`.
    pub(super) fn workflow_over<R: TaskRepository>(
        &self,
        tasks: R,
    ) -> TaskWorkflowService<
        R,
        InMemoryUserRepository,
        InMemoryTicketRepository,
        Notifications,
        ManualClock,
    > {
        TaskWorkflowService::new(
            Arc::new(tasks),
            Arc::clone(&self.users),
            Arc::clone(&self.tickets),
            Arc::clone(&self.notifications),
            Arc::new(self.clock.clone()),
            WorkflowPolicy::default(),
        )
    }

    pub(super) fn sweeper(&self) -> Sweeper {
        ExpirySweeper::new(
            Arc::clone(&self.tasks),
            Arc::clone(&self.users),
            Arc::clone(&self.notifications),
            Arc::new(self.clock.clone()),
        )
    }

    pub(super) async fn user(&self, handle: &str, role: Role) -> eyre::Result<User> {
        let user = User::new(handle.to_uppercase(), MentionHandle::new(handle)?, role)?;
        self.users.store(&user).await?;
        Ok(user)
    }

    pub(super) async fn report(
        &self,
        handle: &str,
        role: Role,
        relation: Hierarchy,
        manager: UserId,
    ) -> eyre::Result<User> {
        let user = User::new(handle.to_uppercase(), MentionHandle::new(handle)?, role)?
            .reporting_to(relation, manager);
        self.users.store(&user).await?;
        Ok(user)
    }

    pub(super) fn messages_for(&self, user: UserId) -> Vec<String> {
        self.notifications
            .delivered_to(user)
            .expect("notification store readable")
            .into_iter()
            .map(|notification| notification.message)
            .collect()
    }
}

/// Builds a bare aggregate without going through the services.
pub(super) fn new_task(kind: TaskKind, creator: UserId, clock: &impl Clock) -> Task {
    Task::create(
        NewTask {
            kind,
            number: TaskNumber::compose(kind, clock.utc().date_naive(), 1),
            name: "Fix login".to_owned(),
            description: "Login fails on Safari".to_owned(),
            urgency: Urgency::default(),
            priority: Priority::default(),
            created_by: creator,
            assigned_to: BTreeSet::new(),
            ticket: None,
            parent_task: None,
            due_date: None,
            estimated_hours: None,
        },
        clock,
    )
    .expect("valid task")
}
