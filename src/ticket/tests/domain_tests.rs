//! Tests for ticket status rules and visibility.

use crate::identity::domain::{Actor, Role, UserId};
use crate::ticket::domain::{Ticket, TicketDomainError, TicketStatus};
use mockable::DefaultClock;
use rstest::rstest;

#[rstest]
#[case(TicketStatus::Open, TicketStatus::InProgress, true)]
#[case(TicketStatus::Open, TicketStatus::Rejected, true)]
#[case(TicketStatus::Open, TicketStatus::Closed, false)]
#[case(TicketStatus::InProgress, TicketStatus::Resolved, true)]
#[case(TicketStatus::Resolved, TicketStatus::InProgress, true)]
#[case(TicketStatus::Resolved, TicketStatus::Closed, true)]
#[case(TicketStatus::Closed, TicketStatus::Open, false)]
#[case(TicketStatus::Rejected, TicketStatus::InProgress, false)]
fn transition_table(
    #[case] from: TicketStatus,
    #[case] to: TicketStatus,
    #[case] allowed: bool,
) {
    assert_eq!(from.can_transition_to(to), allowed);
}

#[rstest]
fn blank_title_is_rejected() {
    let result = Ticket::open("  ", "body", UserId::new(), &DefaultClock);
    assert!(matches!(result, Err(TicketDomainError::EmptyTitle)));
}

#[rstest]
fn invalid_transition_leaves_status_unchanged() -> eyre::Result<()> {
    let clock = DefaultClock;
    let mut ticket = Ticket::open("Printer", "Jammed", UserId::new(), &clock)?;

    let result = ticket.transition_to(TicketStatus::Closed, &clock);

    eyre::ensure!(result.is_err(), "Open -> Closed must be rejected");
    eyre::ensure!(ticket.status() == TicketStatus::Open);
    Ok(())
}

#[rstest]
#[case(Role::Admin, true)]
#[case(Role::ProjectManager, true)]
#[case(Role::AgentCommercial, true)]
#[case(Role::Developer, false)]
#[case(Role::Client, false)]
fn visibility_of_foreign_ticket(#[case] role: Role, #[case] visible: bool) -> eyre::Result<()> {
    let ticket = Ticket::open("Printer", "Jammed", UserId::new(), &DefaultClock)?;
    let actor = Actor::new(UserId::new(), role);

    eyre::ensure!(ticket.is_accessible_by(&actor) == visible);
    Ok(())
}

#[rstest]
fn creator_always_sees_own_ticket() -> eyre::Result<()> {
    let owner = UserId::new();
    let ticket = Ticket::open("Printer", "Jammed", owner, &DefaultClock)?;

    eyre::ensure!(ticket.is_accessible_by(&Actor::new(owner, Role::Client)));
    Ok(())
}
