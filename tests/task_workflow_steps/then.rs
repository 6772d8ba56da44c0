//! Then steps for the task workflow BDD scenarios.

use super::world::WorkflowWorld;
use rstest_bdd_macros::then;
use ticketflow::task::{
    domain::{PerformedBy, TaskStatus},
    services::{ErrorKind, SweepReport},
};

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &WorkflowWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let actual = world.reload()?.status();
    eyre::ensure!(actual == expected, "expected status {expected}, found {actual}");
    Ok(())
}

#[then(r#"the last history entry is "{action}""#)]
fn last_history_entry(world: &WorkflowWorld, action: String) -> Result<(), eyre::Report> {
    let task = world.reload()?;
    let last = task
        .history()
        .last()
        .ok_or_else(|| eyre::eyre!("task has no history"))?;
    eyre::ensure!(
        last.action().as_str() == action,
        "expected last action {action}, found {}",
        last.action()
    );
    Ok(())
}

#[then("the last attempt was refused")]
fn last_attempt_refused(world: &WorkflowWorld) -> Result<(), eyre::Report> {
    let failure = world
        .last_failure
        .as_ref()
        .ok_or_else(|| eyre::eyre!("expected the last attempt to fail"))?;
    eyre::ensure!(
        failure.kind() == ErrorKind::Authorization,
        "expected an authorization failure, got {failure:?}"
    );
    Ok(())
}

#[then("the task is not archived")]
fn task_not_archived(world: &WorkflowWorld) -> Result<(), eyre::Report> {
    let task = world.reload()?;
    eyre::ensure!(
        task.archived_at().is_none(),
        "task still archived at {:?}",
        task.archived_at()
    );
    Ok(())
}

#[then(r#""{handle}" received {count:usize} notification"#)]
fn received_notifications(
    world: &WorkflowWorld,
    handle: String,
    count: usize,
) -> Result<(), eyre::Report> {
    let inbox = world.inbox(&handle)?;
    eyre::ensure!(inbox.len() == count, "inbox of {handle} was {inbox:?}");
    Ok(())
}

#[then(r#""{handle}" was told "{message}""#)]
fn was_told(world: &WorkflowWorld, handle: String, message: String) -> Result<(), eyre::Report> {
    let inbox = world.inbox(&handle)?;
    eyre::ensure!(inbox.contains(&message), "inbox of {handle} was {inbox:?}");
    Ok(())
}

#[then(r#""{handle}" heard the task moved from "{previous}" to "{current}" by "{actor}""#)]
fn heard_status_change(
    world: &WorkflowWorld,
    handle: String,
    previous: String,
    current: String,
    actor: String,
) -> Result<(), eyre::Report> {
    let task = world.reload()?;
    let expected = format!(
        "Task {} ({}) changed from {previous} to {current} by {actor}",
        task.name(),
        task.number()
    );
    let inbox = world.inbox(&handle)?;
    eyre::ensure!(inbox.contains(&expected), "inbox of {handle} was {inbox:?}");
    Ok(())
}

#[then("the sweep transitioned {count:usize} task")]
fn sweep_transitioned(world: &WorkflowWorld, count: usize) -> Result<(), eyre::Report> {
    let report = world
        .last_sweep
        .ok_or_else(|| eyre::eyre!("the sweeper has not run"))?;
    eyre::ensure!(report.transitioned() == count, "sweep report was {report:?}");
    Ok(())
}

#[then("the sweep left every task untouched")]
fn sweep_left_tasks_untouched(world: &WorkflowWorld) -> Result<(), eyre::Report> {
    let report = world
        .last_sweep
        .ok_or_else(|| eyre::eyre!("the sweeper has not run"))?;
    eyre::ensure!(report == SweepReport::default(), "sweep report was {report:?}");
    Ok(())
}

#[then("the last change was made by the system")]
fn last_change_by_system(world: &WorkflowWorld) -> Result<(), eyre::Report> {
    let task = world.reload()?;
    let performer = task.history().last().map(|entry| entry.performed_by);
    eyre::ensure!(
        performer == Some(PerformedBy::System),
        "last change was made by {performer:?}"
    );
    Ok(())
}
