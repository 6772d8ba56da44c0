//! Shared wiring for the in-memory integration tests.

use chrono::{DateTime, TimeZone, Utc};
use rstest::fixture;
use std::sync::Arc;
use ticketflow::clock::ManualClock;
use ticketflow::identity::{
    adapters::memory::InMemoryUserRepository,
    domain::{Hierarchy, MentionHandle, Role, User, UserId},
    ports::UserRepository,
};
use ticketflow::notification::adapters::memory::InMemoryNotificationService;
use ticketflow::task::{
    adapters::memory::InMemoryTaskRepository,
    services::{ExpirySweeper, TaskWorkflowService, WorkflowPolicy},
};
use ticketflow::ticket::{adapters::memory::InMemoryTicketRepository, services::TicketService};

/// Notification adapter used by the tests.
pub type Notifications = InMemoryNotificationService<InMemoryUserRepository, ManualClock>;

/// Workflow service wired to in-memory adapters.
pub type Workflow = TaskWorkflowService<
    InMemoryTaskRepository,
    InMemoryUserRepository,
    InMemoryTicketRepository,
    Notifications,
    ManualClock,
>;

/// Sweeper wired to in-memory adapters.
pub type Sweeper =
    ExpirySweeper<InMemoryTaskRepository, InMemoryUserRepository, Notifications, ManualClock>;

/// Ticket service wired to in-memory adapters.
pub type Tickets = TicketService<InMemoryTicketRepository, ManualClock>;

/// Tuesday 3 March 2026, 08:30 UTC.
#[must_use]
pub fn opening_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 3, 8, 30, 0)
        .single()
        .expect("valid opening time")
}

/// A fully wired in-memory deployment.
pub struct Desk {
    pub clock: ManualClock,
    pub tasks: Arc<InMemoryTaskRepository>,
    pub users: Arc<InMemoryUserRepository>,
    pub notifications: Arc<Notifications>,
    pub tickets: Tickets,
    pub workflow: Workflow,
}

impl Desk {
    /// Wires every service with `policy`.
    #[must_use]
    pub fn new(policy: WorkflowPolicy) -> Self {
        let clock = ManualClock::new(opening_time());
        let shared_clock = Arc::new(clock.clone());
        let tasks = Arc::new(InMemoryTaskRepository::new());
        let users = Arc::new(InMemoryUserRepository::new());
        let ticket_store = Arc::new(InMemoryTicketRepository::new());
        let notifications = Arc::new(InMemoryNotificationService::new(
            Arc::clone(&users),
            Arc::clone(&shared_clock),
        ));
        let workflow = TaskWorkflowService::new(
            Arc::clone(&tasks),
            Arc::clone(&users),
            Arc::clone(&ticket_store),
            Arc::clone(&notifications),
            Arc::clone(&shared_clock),
            policy,
        );
        Self {
            clock,
            tasks,
            users,
            notifications,
            tickets: TicketService::new(ticket_store, shared_clock),
            workflow,
        }
    }

    /// Builds a sweeper sharing the desk's stores and clock.
    #[must_use]
    pub fn sweeper(&self) -> Sweeper {
        ExpirySweeper::new(
            Arc::clone(&self.tasks),
            Arc::clone(&self.users),
            Arc::clone(&self.notifications),
            Arc::new(self.clock.clone()),
        )
    }

    /// Registers a user whose display name is the capitalised handle.
    pub async fn hire(&self, handle: &str, role: Role) -> eyre::Result<User> {
        self.store(display_name(handle), handle, role, None).await
    }

    /// Registers a user reporting to `manager`.
    pub async fn hire_under(
        &self,
        handle: &str,
        role: Role,
        relation: Hierarchy,
        manager: UserId,
    ) -> eyre::Result<User> {
        self.store(display_name(handle), handle, role, Some((relation, manager)))
            .await
    }

    async fn store(
        &self,
        name: String,
        handle: &str,
        role: Role,
        manager: Option<(Hierarchy, UserId)>,
    ) -> eyre::Result<User> {
        let mut user = User::new(name, MentionHandle::new(handle)?, role)?;
        if let Some((relation, id)) = manager {
            user = user.reporting_to(relation, id);
        }
        self.users.store(&user).await?;
        Ok(user)
    }

    /// Returns the rendered notifications delivered to `user`.
    pub fn inbox(&self, user: UserId) -> eyre::Result<Vec<String>> {
        Ok(self
            .notifications
            .delivered_to(user)?
            .into_iter()
            .map(|notification| notification.message)
            .collect())
    }
}

fn display_name(handle: &str) -> String {
    let mut chars = handle.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Provides a desk with the default policy.
#[fixture]
pub fn desk() -> Desk {
    Desk::new(WorkflowPolicy::default())
}
