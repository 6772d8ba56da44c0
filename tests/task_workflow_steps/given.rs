//! Given steps for the task workflow BDD scenarios.

use super::world::{WorkflowWorld, run_async, scenario_start};
use chrono::Duration;
use eyre::WrapErr;
use rstest_bdd_macros::given;
use ticketflow::identity::domain::Role;
use ticketflow::task::{domain::TaskKind, services::CreateTaskRequest};

#[given(r#"a "{role}" called "{handle}""#)]
fn registered_user(
    world: &mut WorkflowWorld,
    role: String,
    handle: String,
) -> Result<(), eyre::Report> {
    let parsed = Role::try_from(role.as_str())?;
    world.register(&handle, parsed)
}

#[given(r#""{creator}" created the task "{name}" for "{assignee}""#)]
fn task_created_for(
    world: &mut WorkflowWorld,
    creator: String,
    name: String,
    assignee: String,
) -> Result<(), eyre::Report> {
    let request = CreateTaskRequest::new(TaskKind::Task, name, "Created by scenario")
        .with_assignees(world.person(&assignee)?.id());
    create(world, &creator, request)
}

#[given(r#""{creator}" created the test task "{name}" estimated at {hours:u32} hours"#)]
fn test_task_with_estimate(
    world: &mut WorkflowWorld,
    creator: String,
    name: String,
    hours: u32,
) -> Result<(), eyre::Report> {
    let request = CreateTaskRequest::new(TaskKind::TestTask, name, "Created by scenario")
        .with_estimated_hours(f64::from(hours))
        .with_assignees(world.person(&creator)?.id());
    create(world, &creator, request)
}

#[given(r#""{creator}" created the task "{name}" due in {hours:u32} hours"#)]
fn task_with_due_date(
    world: &mut WorkflowWorld,
    creator: String,
    name: String,
    hours: u32,
) -> Result<(), eyre::Report> {
    let request = CreateTaskRequest::new(TaskKind::Task, name, "Created by scenario")
        .with_due_date(scenario_start() + Duration::hours(i64::from(hours)));
    create(world, &creator, request)
}

fn create(
    world: &mut WorkflowWorld,
    creator: &str,
    request: CreateTaskRequest,
) -> Result<(), eyre::Report> {
    let actor = world.actor(creator)?;
    let task = run_async(world.workflow.create_task(&actor, request))
        .wrap_err("create task for scenario setup")?;
    world.current_task = Some(task.id());
    Ok(())
}
