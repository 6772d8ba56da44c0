//! End-to-end flows from a client ticket to a finished task.

use super::helpers::{Desk, desk};
use chrono::Duration;
use rstest::rstest;
use ticketflow::identity::domain::{Hierarchy, Role};
use ticketflow::task::{
    domain::{HistoryAction, TaskKind, TaskStatus},
    services::{AddCommentRequest, CreateTaskRequest, ErrorKind},
};
use ticketflow::ticket::{domain::TicketStatus, services::OpenTicketRequest};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn client_ticket_becomes_a_delivered_task(desk: Desk) -> eyre::Result<()> {
    let client = desk.hire("acme", Role::Client).await?;
    let manager = desk.hire("paula", Role::ProjectManager).await?;
    let developer = desk
        .hire_under("dan", Role::Developer, Hierarchy::ProjectManager, manager.id())
        .await?;
    let ticket = desk
        .tickets
        .open_ticket(
            &client.actor(),
            OpenTicketRequest::new("Invoices missing", "March invoices are not listed"),
        )
        .await?;
    desk.tickets
        .transition(&manager.actor(), ticket.id(), TicketStatus::InProgress)
        .await?;

    let task = desk
        .workflow
        .create_task(
            &manager.actor(),
            CreateTaskRequest::new(TaskKind::Task, "List March invoices", "Fix the filter")
                .with_ticket(ticket.id())
                .with_assignees(developer.id()),
        )
        .await?;
    desk.clock.advance(Duration::minutes(30));
    desk.workflow
        .change_status(&developer.actor(), task.id(), TaskStatus::InProgress, None)
        .await?;
    desk.clock.advance(Duration::hours(3));
    desk.workflow
        .change_status(&developer.actor(), task.id(), TaskStatus::Testing, None)
        .await?;
    let done = desk
        .workflow
        .change_status(&manager.actor(), task.id(), TaskStatus::Done, None)
        .await?;

    eyre::ensure!(done.ticket() == Some(ticket.id()));
    eyre::ensure!(done.archived_at().is_some());
    eyre::ensure!(done.actual_hours() == Some(3.0));
    let status_changes = done
        .history()
        .iter()
        .filter(|entry| entry.action() == HistoryAction::StatusChanged)
        .count();
    eyre::ensure!(status_changes == 3);
    let inbox = desk.inbox(developer.id())?;
    let assignment = inbox.first().map(String::as_str);
    eyre::ensure!(
        assignment == Some("Paula assigned you to task: List March invoices"),
        "inbox was {inbox:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn clients_cannot_see_other_clients_tickets(desk: Desk) -> eyre::Result<()> {
    let owner = desk.hire("acme", Role::Client).await?;
    let rival = desk.hire("globex", Role::Client).await?;
    let ticket = desk
        .tickets
        .open_ticket(
            &owner.actor(),
            OpenTicketRequest::new("Export broken", "CSV export times out"),
        )
        .await?;

    eyre::ensure!(desk.tickets.find_for(&owner.actor(), ticket.id()).await.is_ok());
    eyre::ensure!(desk.tickets.find_for(&rival.actor(), ticket.id()).await.is_err());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn developers_cannot_reopen_finished_work(desk: Desk) -> eyre::Result<()> {
    let manager = desk.hire("paula", Role::ProjectManager).await?;
    let developer = desk.hire("dan", Role::Developer).await?;
    let task = desk
        .workflow
        .create_task(
            &manager.actor(),
            CreateTaskRequest::new(TaskKind::Task, "Bump deps", "Quarterly refresh")
                .with_assignees(developer.id()),
        )
        .await?;
    desk.workflow
        .change_status(&developer.actor(), task.id(), TaskStatus::Done, None)
        .await?;

    let refused = desk
        .workflow
        .change_status(&developer.actor(), task.id(), TaskStatus::InProgress, None)
        .await;
    let reopened = desk
        .workflow
        .change_status(&manager.actor(), task.id(), TaskStatus::InProgress, None)
        .await?;

    eyre::ensure!(refused.is_err_and(|err| err.kind() == ErrorKind::Authorization));
    eyre::ensure!(reopened.status() == TaskStatus::InProgress);
    eyre::ensure!(reopened.archived_at().is_none());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn blocked_work_resumes_where_it_stopped(desk: Desk) -> eyre::Result<()> {
    let manager = desk.hire("paula", Role::ProjectManager).await?;
    let developer = desk.hire("dan", Role::Developer).await?;
    let task = desk
        .workflow
        .create_task(
            &manager.actor(),
            CreateTaskRequest::new(TaskKind::Task, "Migrate DNS", "Move zone")
                .with_assignees(developer.id()),
        )
        .await?;
    desk.workflow
        .change_status(&developer.actor(), task.id(), TaskStatus::InProgress, None)
        .await?;

    let first = desk
        .workflow
        .add_blocker(&developer.actor(), task.id(), "Registrar lock", None)
        .await?;
    let second = desk
        .workflow
        .add_blocker(
            &developer.actor(),
            task.id(),
            "Waiting on credentials",
            Some("Client has to send the registrar login".to_owned()),
        )
        .await?;
    let partly = desk
        .workflow
        .resolve_blocker(&developer.actor(), task.id(), first.id)
        .await?;
    let resumed = desk
        .workflow
        .resolve_blocker(&manager.actor(), task.id(), second.id)
        .await?;

    eyre::ensure!(partly.status() == TaskStatus::Blocked);
    eyre::ensure!(resumed.status() == TaskStatus::InProgress);
    eyre::ensure!(resumed.open_blockers().next().is_none());
    eyre::ensure!(resumed.blockers().len() == 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn comment_mentions_reach_the_mentioned_colleague(desk: Desk) -> eyre::Result<()> {
    let manager = desk.hire("paula", Role::ProjectManager).await?;
    let developer = desk.hire("dan", Role::Developer).await?;
    let reviewer = desk.hire("rita", Role::GroupLeader).await?;
    let task = desk
        .workflow
        .create_task(
            &manager.actor(),
            CreateTaskRequest::new(TaskKind::Task, "Audit logs", "Retention policy")
                .with_assignees(developer.id()),
        )
        .await?;

    let view = desk
        .workflow
        .add_comment(
            &developer.actor(),
            task.id(),
            AddCommentRequest::new("@rita can you double-check the 90 day window?"),
        )
        .await?;

    let Some(comment) = view.task().comments().last() else {
        eyre::bail!("comment was not stored");
    };
    eyre::ensure!(comment.mentions.iter().all(|mention| mention.notified));
    eyre::ensure!(view.display_name(comment.author) == Some("Dan"));
    let inbox = desk.inbox(reviewer.id())?;
    eyre::ensure!(
        inbox == ["Dan mentioned you in a comment on task: Audit logs"],
        "inbox was {inbox:?}"
    );
    Ok(())
}
