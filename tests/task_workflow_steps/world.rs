//! Shared world state for the task workflow BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rstest::fixture;
use ticketflow::clock::ManualClock;
use ticketflow::identity::{
    adapters::memory::InMemoryUserRepository,
    domain::{Actor, MentionHandle, Role, User},
    ports::UserRepository,
};
use ticketflow::notification::adapters::memory::InMemoryNotificationService;
use ticketflow::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{Task, TaskId},
    ports::TaskRepository,
    services::{
        ExpirySweeper, SweepReport, TaskServiceError, TaskWorkflowService, WorkflowPolicy,
    },
};
use ticketflow::ticket::adapters::memory::InMemoryTicketRepository;

/// Notification adapter used by the scenarios.
pub type Notifications = InMemoryNotificationService<InMemoryUserRepository, ManualClock>;

/// Workflow service used by the scenarios.
pub type TestWorkflow = TaskWorkflowService<
    InMemoryTaskRepository,
    InMemoryUserRepository,
    InMemoryTicketRepository,
    Notifications,
    ManualClock,
>;

/// Scenario world for workflow and sweeper behaviour tests.
pub struct WorkflowWorld {
    pub clock: ManualClock,
    pub tasks: Arc<InMemoryTaskRepository>,
    pub users: Arc<InMemoryUserRepository>,
    pub notifications: Arc<Notifications>,
    pub workflow: TestWorkflow,
    pub people: HashMap<String, User>,
    pub current_task: Option<TaskId>,
    pub last_failure: Option<TaskServiceError>,
    pub last_sweep: Option<SweepReport>,
}

impl WorkflowWorld {
    /// Creates a world with empty stores and a frozen clock.
    #[must_use]
    pub fn new() -> Self {
        let clock = ManualClock::new(scenario_start());
        let shared_clock = Arc::new(clock.clone());
        let tasks = Arc::new(InMemoryTaskRepository::new());
        let users = Arc::new(InMemoryUserRepository::new());
        let notifications = Arc::new(InMemoryNotificationService::new(
            Arc::clone(&users),
            Arc::clone(&shared_clock),
        ));
        let workflow = TaskWorkflowService::new(
            Arc::clone(&tasks),
            Arc::clone(&users),
            Arc::new(InMemoryTicketRepository::new()),
            Arc::clone(&notifications),
            shared_clock,
            WorkflowPolicy::default(),
        );

        Self {
            clock,
            tasks,
            users,
            notifications,
            workflow,
            people: HashMap::new(),
            current_task: None,
            last_failure: None,
            last_sweep: None,
        }
    }

    /// Registers `handle` with `role`; the display name is the capitalised
    /// handle.
    pub fn register(&mut self, handle: &str, role: Role) -> Result<(), eyre::Report> {
        let user = User::new(capitalise(handle), MentionHandle::new(handle)?, role)?;
        run_async(self.users.store(&user))?;
        self.people.insert(handle.to_owned(), user);
        Ok(())
    }

    /// Returns the registered user called `handle`.
    pub fn person(&self, handle: &str) -> Result<&User, eyre::Report> {
        self.people
            .get(handle)
            .ok_or_else(|| eyre::eyre!("no user called {handle} in scenario world"))
    }

    /// Returns the acting identity of `handle`.
    pub fn actor(&self, handle: &str) -> Result<Actor, eyre::Report> {
        self.person(handle).map(User::actor)
    }

    /// Returns the scenario's task identifier.
    pub fn task_id(&self) -> Result<TaskId, eyre::Report> {
        self.current_task
            .ok_or_else(|| eyre::eyre!("missing created task in scenario world"))
    }

    /// Reloads the scenario's task from the store.
    pub fn reload(&self) -> Result<Task, eyre::Report> {
        let id = self.task_id()?;
        run_async(self.tasks.find_by_id(id))?
            .ok_or_else(|| eyre::eyre!("task {id} vanished from the store"))
    }

    /// Returns the messages delivered to `handle`.
    pub fn inbox(&self, handle: &str) -> Result<Vec<String>, eyre::Report> {
        let recipient = self.person(handle)?.id();
        Ok(self
            .notifications
            .delivered_to(recipient)?
            .into_iter()
            .map(|notification| notification.message)
            .collect())
    }

    /// Runs one sweep over the world's stores.
    pub fn sweep(&mut self) -> Result<(), eyre::Report> {
        let sweeper = ExpirySweeper::new(
            Arc::clone(&self.tasks),
            Arc::clone(&self.users),
            Arc::clone(&self.notifications),
            Arc::new(self.clock.clone()),
        );
        self.last_sweep = Some(run_async(sweeper.sweep())?);
        Ok(())
    }
}

impl Default for WorkflowWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> WorkflowWorld {
    WorkflowWorld::default()
}

/// Monday 2 March 2026, 10:00 UTC.
#[must_use]
pub fn scenario_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0)
        .single()
        .expect("valid scenario start")
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

fn capitalise(handle: &str) -> String {
    let mut chars = handle.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
