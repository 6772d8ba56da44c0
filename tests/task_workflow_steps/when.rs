//! When steps for the task workflow BDD scenarios.

use super::world::{WorkflowWorld, run_async};
use chrono::Duration;
use eyre::WrapErr;
use rstest_bdd_macros::when;
use ticketflow::task::{domain::TaskStatus, services::AddCommentRequest};

fn parse_status(status: &str) -> Result<TaskStatus, eyre::Report> {
    TaskStatus::try_from(status).map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))
}

#[when(r#""{handle}" moves the task to "{status}""#)]
fn move_task(
    world: &mut WorkflowWorld,
    handle: String,
    status: String,
) -> Result<(), eyre::Report> {
    let actor = world.actor(&handle)?;
    let target = parse_status(&status)?;
    let id = world.task_id()?;
    run_async(world.workflow.change_status(&actor, id, target, None))
        .wrap_err_with(|| format!("move task to {status}"))?;
    Ok(())
}

#[when(r#""{handle}" tries to move the task to "{status}""#)]
fn try_move_task(
    world: &mut WorkflowWorld,
    handle: String,
    status: String,
) -> Result<(), eyre::Report> {
    let actor = world.actor(&handle)?;
    let target = parse_status(&status)?;
    let id = world.task_id()?;
    world.last_failure = run_async(world.workflow.change_status(&actor, id, target, None)).err();
    Ok(())
}

#[when(r#""{handle}" reports the blocker "{reason}""#)]
fn report_blocker(
    world: &mut WorkflowWorld,
    handle: String,
    reason: String,
) -> Result<(), eyre::Report> {
    let actor = world.actor(&handle)?;
    let id = world.task_id()?;
    run_async(world.workflow.add_blocker(&actor, id, &reason, None)).wrap_err("add blocker")?;
    Ok(())
}

#[when(r#""{handle}" resolves the open blocker"#)]
fn resolve_open_blocker(world: &mut WorkflowWorld, handle: String) -> Result<(), eyre::Report> {
    let actor = world.actor(&handle)?;
    let id = world.task_id()?;
    let blocker = world
        .reload()?
        .open_blockers()
        .next()
        .map(|open| open.id)
        .ok_or_else(|| eyre::eyre!("task has no open blocker"))?;
    run_async(world.workflow.resolve_blocker(&actor, id, blocker)).wrap_err("resolve blocker")?;
    Ok(())
}

#[when(r#""{handle}" comments "{text}" mentioning "{mentioned}""#)]
fn comment_with_mention(
    world: &mut WorkflowWorld,
    handle: String,
    text: String,
    mentioned: String,
) -> Result<(), eyre::Report> {
    let actor = world.actor(&handle)?;
    let id = world.task_id()?;
    let request = AddCommentRequest::new(text).with_mentions([world.person(&mentioned)?.id()]);
    run_async(world.workflow.add_comment(&actor, id, request)).wrap_err("add comment")?;
    Ok(())
}

#[when("{hours:u32} hours pass")]
fn hours_pass(world: &mut WorkflowWorld, hours: u32) {
    world.clock.advance(Duration::hours(i64::from(hours)));
}

#[when("the sweeper runs")]
fn sweeper_runs(world: &mut WorkflowWorld) -> Result<(), eyre::Report> {
    world.sweep().wrap_err("run expiry sweep")
}
