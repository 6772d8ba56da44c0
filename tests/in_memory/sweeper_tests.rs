//! Expiry sweeper behaviour through the public API.

use super::helpers::{Desk, desk, opening_time};
use chrono::Duration;
use rstest::rstest;
use std::sync::Arc;
use ticketflow::identity::domain::Role;
use ticketflow::task::{
    domain::{PerformedBy, TaskKind, TaskStatus},
    services::{CreateTaskRequest, SweepReport},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn one_sweep_handles_both_passes(desk: Desk) -> eyre::Result<()> {
    let lead = desk.hire("rhea", Role::ResponsibleTester).await?;
    let manager = desk.hire("paula", Role::ProjectManager).await?;
    let verification = desk
        .workflow
        .create_task(
            &lead.actor(),
            CreateTaskRequest::new(TaskKind::TestTask, "Verify checkout", "Smoke suite")
                .with_estimated_hours(2.0)
                .with_assignees(lead.id()),
        )
        .await?;
    desk.workflow
        .change_status(&lead.actor(), verification.id(), TaskStatus::Testing, None)
        .await?;
    let chore = desk
        .workflow
        .create_task(
            &manager.actor(),
            CreateTaskRequest::new(TaskKind::Task, "Renew domain", "Before expiry")
                .with_due_date(opening_time() + Duration::hours(1)),
        )
        .await?;
    desk.clock.advance(Duration::hours(3));

    let report = desk.sweeper().sweep().await?;

    eyre::ensure!(
        report
            == SweepReport {
                expired: 1,
                overdue: 1,
                ..SweepReport::default()
            },
        "report was {report:?}"
    );
    for (id, expected) in [
        (verification.id(), TaskStatus::Expired),
        (chore.id(), TaskStatus::Overdue),
    ] {
        let view = desk.workflow.get_task(&manager.actor(), id).await?;
        let task = view.task();
        eyre::ensure!(task.status() == expected);
        let performer = task.history().last().map(|entry| entry.performed_by);
        eyre::ensure!(performer == Some(PerformedBy::System));
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn archived_tasks_are_never_swept_again(desk: Desk) -> eyre::Result<()> {
    let lead = desk.hire("rhea", Role::ResponsibleTester).await?;
    let verification = desk
        .workflow
        .create_task(
            &lead.actor(),
            CreateTaskRequest::new(TaskKind::TestTask, "Verify refunds", "Regression")
                .with_estimated_hours(1.0),
        )
        .await?;
    desk.workflow
        .change_status(&lead.actor(), verification.id(), TaskStatus::Testing, None)
        .await?;
    desk.workflow
        .record_test_result(&lead.actor(), verification.id(), true, None)
        .await?;
    desk.clock.advance(Duration::days(2));

    let report = desk.sweeper().sweep().await?;

    eyre::ensure!(report == SweepReport::default());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stopping_an_idle_sweeper_is_clean(desk: Desk) -> eyre::Result<()> {
    let handle = Arc::new(desk.sweeper()).start(std::time::Duration::from_millis(15));
    tokio::time::sleep(std::time::Duration::from_millis(40)).await;

    eyre::ensure!(!handle.is_finished());
    handle.stop().await?;
    Ok(())
}
