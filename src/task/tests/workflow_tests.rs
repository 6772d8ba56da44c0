//! Workflow service tests over the in-memory adapters.

use super::support::{MockTasks, World};
use crate::identity::domain::{Role, UserId};
use crate::task::{
    domain::{HistoryAction, HistoryEntry, TaskDomainError, TaskId, TaskKind, TaskStatus},
    ports::{TaskRepository, TaskRepositoryError},
    services::{
        AddCommentRequest, CreateTaskRequest, ErrorKind, TaskPatch, TaskServiceError,
        UploadedFile, WorkflowPolicy,
    },
};
use crate::ticket::{
    domain::{Ticket, TicketId},
    ports::TicketRepository,
};
use rstest::{fixture, rstest};

#[fixture]
fn world() -> World {
    World::new(WorkflowPolicy::default())
}

fn fix_login() -> CreateTaskRequest {
    CreateTaskRequest::new(TaskKind::Task, "Fix login", "Login fails on Safari")
}

#[rstest]
#[case(Role::Developer, TaskKind::Task)]
#[case(Role::Tester, TaskKind::TestTask)]
#[case(Role::GroupLeader, TaskKind::TestTask)]
#[case(Role::ResponsibleTester, TaskKind::Task)]
#[tokio::test(flavor = "multi_thread")]
async fn roles_outside_the_creation_matrix_are_refused(
    world: World,
    #[case] role: Role,
    #[case] kind: TaskKind,
) -> eyre::Result<()> {
    let actor = world.user("someone", role).await?;

    let result = world
        .workflow
        .create_task(&actor.actor(), CreateTaskRequest::new(kind, "Work", "Details"))
        .await;

    let Err(err) = result else {
        eyre::bail!("creation should be refused");
    };
    eyre::ensure!(err.kind() == ErrorKind::Authorization);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn creation_notifies_each_assignee(world: World) -> eyre::Result<()> {
    let manager = world.user("pm", Role::ProjectManager).await?;
    let alice = world.user("alice", Role::Developer).await?;
    let bob = world.user("bob", Role::Developer).await?;

    let task = world
        .workflow
        .create_task(
            &manager.actor(),
            fix_login().with_assignees(vec![alice.id(), bob.id(), alice.id()]),
        )
        .await?;

    eyre::ensure!(task.assigned_to().len() == 2);
    let actions: Vec<HistoryAction> = task.history().iter().map(HistoryEntry::action).collect();
    eyre::ensure!(actions == vec![HistoryAction::Created, HistoryAction::Assigned]);
    for user in [alice.id(), bob.id()] {
        eyre::ensure!(world.messages_for(user) == vec!["PM assigned you to task: Fix login"]);
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn creation_rejects_unknown_references(world: World) -> eyre::Result<()> {
    let manager = world.user("pm", Role::ProjectManager).await?;

    let unknown_assignee = world
        .workflow
        .create_task(&manager.actor(), fix_login().with_assignees(UserId::new()))
        .await;
    let unknown_ticket = world
        .workflow
        .create_task(&manager.actor(), fix_login().with_ticket(TicketId::new()))
        .await;

    eyre::ensure!(matches!(unknown_assignee, Err(TaskServiceError::NotFound(_))));
    eyre::ensure!(matches!(unknown_ticket, Err(TaskServiceError::NotFound(_))));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn tasks_link_to_existing_tickets(world: World) -> eyre::Result<()> {
    let client = world.user("client", Role::Client).await?;
    let manager = world.user("pm", Role::ProjectManager).await?;
    let ticket = Ticket::open("Printer", "Jammed", client.id(), &world.clock)?;
    world.tickets.store(&ticket).await?;

    let task = world
        .workflow
        .create_task(&manager.actor(), fix_login().with_ticket(ticket.id()))
        .await?;

    eyre::ensure!(task.ticket() == Some(ticket.id()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn description_mentions_are_recorded_and_notified(world: World) -> eyre::Result<()> {
    let manager = world.user("pm", Role::ProjectManager).await?;
    let reviewer = world.user("reviewer", Role::Developer).await?;

    let task = world
        .workflow
        .create_task(
            &manager.actor(),
            CreateTaskRequest::new(TaskKind::Task, "Fix login", "Needs @reviewer sign-off"),
        )
        .await?;

    let stored = world.workflow.get_task(&manager.actor(), task.id()).await?;
    let mentions = stored.task().mentions();
    eyre::ensure!(mentions.len() == 1);
    eyre::ensure!(mentions.iter().all(|mention| mention.notified));
    eyre::ensure!(world.messages_for(reviewer.id()) == vec!["PM mentioned you in a task"]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn subtasks_need_a_top_level_parent_of_the_same_kind(world: World) -> eyre::Result<()> {
    let manager = world.user("pm", Role::ProjectManager).await?;
    let parent = world.workflow.create_task(&manager.actor(), fix_login()).await?;

    let child = world
        .workflow
        .create_task(
            &manager.actor(),
            CreateTaskRequest::new(TaskKind::Task, "Patch cookie", "Child")
                .with_parent(parent.id()),
        )
        .await?;
    let grandchild = world
        .workflow
        .create_task(
            &manager.actor(),
            CreateTaskRequest::new(TaskKind::Task, "Too deep", "Nested").with_parent(child.id()),
        )
        .await;
    let cross_kind = world
        .workflow
        .create_task(
            &manager.actor(),
            CreateTaskRequest::new(TaskKind::TestTask, "Verify", "Wrong kind")
                .with_parent(parent.id()),
        )
        .await;

    let reloaded = world.workflow.get_task(&manager.actor(), parent.id()).await?;
    eyre::ensure!(reloaded.task().subtasks() == [child.id()]);
    eyre::ensure!(matches!(
        grandchild,
        Err(TaskServiceError::Validation(TaskDomainError::InvalidParent(_)))
    ));
    eyre::ensure!(matches!(
        cross_kind,
        Err(TaskServiceError::Validation(TaskDomainError::InvalidParent(_)))
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_change_requires_access(world: World) -> eyre::Result<()> {
    let manager = world.user("pm", Role::ProjectManager).await?;
    let assignee = world.user("dev", Role::Developer).await?;
    let outsider = world.user("eve", Role::Developer).await?;
    let task = world
        .workflow
        .create_task(&manager.actor(), fix_login().with_assignees(assignee.id()))
        .await?;

    let refused = world
        .workflow
        .change_status(&outsider.actor(), task.id(), TaskStatus::InProgress, None)
        .await;
    let accepted = world
        .workflow
        .change_status(&assignee.actor(), task.id(), TaskStatus::InProgress, None)
        .await?;

    let Err(err) = refused else {
        eyre::bail!("outsider should be refused");
    };
    eyre::ensure!(err.kind() == ErrorKind::Authorization);
    eyre::ensure!(accepted.status() == TaskStatus::InProgress);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_change_notifies_assignees_and_admins_once(world: World) -> eyre::Result<()> {
    let admin = world.user("root", Role::Admin).await?;
    let manager = world.user("pm", Role::ProjectManager).await?;
    let developer = world.user("dev", Role::Developer).await?;
    let task = world
        .workflow
        .create_task(
            &manager.actor(),
            fix_login().with_assignees(vec![developer.id(), admin.id()]),
        )
        .await?;

    world
        .workflow
        .change_status(
            &developer.actor(),
            task.id(),
            TaskStatus::InProgress,
            Some("picked up".to_owned()),
        )
        .await?;

    let expected = format!(
        "Task Fix login ({}) changed from ToDo to InProgress by DEV: picked up",
        task.number()
    );
    for user in [admin.id(), developer.id()] {
        let status_messages: Vec<String> = world
            .messages_for(user)
            .into_iter()
            .filter(|message| message.starts_with("Task "))
            .collect();
        eyre::ensure!(status_messages == vec![expected.clone()]);
    }
    eyre::ensure!(world.messages_for(manager.id()).is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn only_privileged_roles_reopen_terminal_tasks(world: World) -> eyre::Result<()> {
    let manager = world.user("pm", Role::ProjectManager).await?;
    let developer = world.user("dev", Role::Developer).await?;
    let task = world
        .workflow
        .create_task(&manager.actor(), fix_login().with_assignees(developer.id()))
        .await?;
    world
        .workflow
        .change_status(&developer.actor(), task.id(), TaskStatus::Done, None)
        .await?;

    let refused = world
        .workflow
        .change_status(&developer.actor(), task.id(), TaskStatus::InProgress, None)
        .await;
    let reopened = world
        .workflow
        .change_status(&manager.actor(), task.id(), TaskStatus::InProgress, None)
        .await?;

    eyre::ensure!(matches!(refused, Err(TaskServiceError::Authorization { .. })));
    eyre::ensure!(reopened.status() == TaskStatus::InProgress);
    eyre::ensure!(reopened.archived_at().is_none());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn blocker_round_trip_restores_status(world: World) -> eyre::Result<()> {
    let manager = world.user("pm", Role::ProjectManager).await?;
    let developer = world.user("dev", Role::Developer).await?;
    let outsider = world.user("eve", Role::Developer).await?;
    let task = world
        .workflow
        .create_task(&manager.actor(), fix_login().with_assignees(developer.id()))
        .await?;
    world
        .workflow
        .change_status(&developer.actor(), task.id(), TaskStatus::InProgress, None)
        .await?;

    let refused = world
        .workflow
        .add_blocker(&outsider.actor(), task.id(), "Not mine", None)
        .await;
    let blocker = world
        .workflow
        .add_blocker(&developer.actor(), task.id(), "Waiting on keys", None)
        .await?;
    let blocked = world.workflow.get_task(&developer.actor(), task.id()).await?;
    let restored = world
        .workflow
        .resolve_blocker(&developer.actor(), task.id(), blocker.id)
        .await?;

    eyre::ensure!(matches!(refused, Err(TaskServiceError::Authorization { .. })));
    eyre::ensure!(blocked.task().status() == TaskStatus::Blocked);
    eyre::ensure!(restored.status() == TaskStatus::InProgress);
    eyre::ensure!(restored.open_blockers().next().is_none());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_blocker_save_leaves_task_untouched(world: World) -> eyre::Result<()> {
    let manager = world.user("pm", Role::ProjectManager).await?;
    let developer = world.user("dev", Role::Developer).await?;
    let task = world
        .workflow
        .create_task(&manager.actor(), fix_login().with_assignees(developer.id()))
        .await?;
    let before = world
        .workflow
        .change_status(&developer.actor(), task.id(), TaskStatus::InProgress, None)
        .await?;
    let inbox_before = world.messages_for(manager.id());

    let snapshot = before.clone();
    let mut tasks = MockTasks::new();
    tasks
        .expect_find_by_id()
        .returning(move |_| Ok(Some(snapshot.clone())));
    tasks.expect_update().times(1).returning(|_| {
        Err(TaskRepositoryError::persistence(std::io::Error::other(
            "connection reset",
        )))
    });
    let failing = world.workflow_over(tasks);

    let result = failing
        .add_blocker(&developer.actor(), task.id(), "Waiting on keys", None)
        .await;

    let Err(err) = result else {
        eyre::bail!("blocker should not be reported as added");
    };
    eyre::ensure!(err.kind() == ErrorKind::Persistence);
    let Some(stored) = world.tasks.find_by_id(task.id()).await? else {
        eyre::bail!("task vanished");
    };
    eyre::ensure!(stored.status() == TaskStatus::InProgress);
    eyre::ensure!(stored.blockers().is_empty());
    eyre::ensure!(stored.history() == before.history());
    eyre::ensure!(stored == before);
    eyre::ensure!(world.messages_for(manager.id()) == inbox_before);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn blocking_missing_task_is_not_found(world: World) -> eyre::Result<()> {
    let manager = world.user("pm", Role::ProjectManager).await?;

    let result = world
        .workflow
        .add_blocker(&manager.actor(), TaskId::new(), "Gone", None)
        .await;

    let Err(err) = result else {
        eyre::bail!("missing task should fail");
    };
    eyre::ensure!(err.kind() == ErrorKind::NotFound);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn inline_and_explicit_mentions_notify_once(world: World) -> eyre::Result<()> {
    let manager = world.user("pm", Role::ProjectManager).await?;
    let mentioned = world.user("user123", Role::Developer).await?;
    let task = world.workflow.create_task(&manager.actor(), fix_login()).await?;

    let view = world
        .workflow
        .add_comment(
            &manager.actor(),
            task.id(),
            AddCommentRequest::new("@user123 can you look?").with_mentions([mentioned.id()]),
        )
        .await?;

    let comments = view.task().comments();
    let [comment] = comments else {
        eyre::bail!("expected exactly one comment");
    };
    eyre::ensure!(comment.mentions.len() == 1);
    eyre::ensure!(comment.mentions.iter().all(|mention| mention.notified));
    eyre::ensure!(
        world.messages_for(mentioned.id())
            == vec!["PM mentioned you in a comment on task: Fix login"]
    );
    eyre::ensure!(view.display_name(mentioned.id()) == Some("USER123"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn comments_need_text_and_access(world: World) -> eyre::Result<()> {
    let manager = world.user("pm", Role::ProjectManager).await?;
    let outsider = world.user("eve", Role::Developer).await?;
    let task = world.workflow.create_task(&manager.actor(), fix_login()).await?;

    let blank = world
        .workflow
        .add_comment(&manager.actor(), task.id(), AddCommentRequest::new("   "))
        .await;
    let foreign = world
        .workflow
        .add_comment(&outsider.actor(), task.id(), AddCommentRequest::new("hello"))
        .await;

    eyre::ensure!(matches!(
        blank,
        Err(TaskServiceError::Validation(TaskDomainError::EmptyComment))
    ));
    eyre::ensure!(matches!(foreign, Err(TaskServiceError::Authorization { .. })));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn comment_files_are_kept_with_the_comment(world: World) -> eyre::Result<()> {
    let manager = world.user("pm", Role::ProjectManager).await?;
    let task = world.workflow.create_task(&manager.actor(), fix_login()).await?;

    let view = world
        .workflow
        .add_comment(
            &manager.actor(),
            task.id(),
            AddCommentRequest::new("Logs attached")
                .with_files([UploadedFile::new("safari.log", "store/abc123")]),
        )
        .await?;

    let Some(comment) = view.task().comments().first() else {
        eyre::bail!("comment missing");
    };
    eyre::ensure!(comment.files.len() == 1);
    eyre::ensure!(comment.files.iter().all(|file| file.original_name == "safari.log"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_applies_fields_then_status(world: World) -> eyre::Result<()> {
    let manager = world.user("pm", Role::ProjectManager).await?;
    let task = world.workflow.create_task(&manager.actor(), fix_login()).await?;

    let updated = world
        .workflow
        .update_task(
            &manager.actor(),
            task.id(),
            TaskPatch::new()
                .name("Fix Safari login")
                .priority(1)
                .estimated_hours(Some(3.0))
                .status(TaskStatus::InProgress),
        )
        .await?;

    eyre::ensure!(updated.name() == "Fix Safari login");
    eyre::ensure!(updated.estimated_hours() == Some(3.0));
    eyre::ensure!(updated.status() == TaskStatus::InProgress);
    let tail: Vec<HistoryAction> = updated
        .history()
        .iter()
        .rev()
        .take(2)
        .map(HistoryEntry::action)
        .collect();
    eyre::ensure!(tail == vec![HistoryAction::StatusChanged, HistoryAction::Updated]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn invalid_priority_is_a_validation_error(world: World) -> eyre::Result<()> {
    let manager = world.user("pm", Role::ProjectManager).await?;

    let result = world
        .workflow
        .create_task(&manager.actor(), fix_login().with_priority(9))
        .await;

    let Err(err) = result else {
        eyre::bail!("priority 9 should be rejected");
    };
    eyre::ensure!(err.kind() == ErrorKind::Validation);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reassignment_notifies_only_new_users(world: World) -> eyre::Result<()> {
    let manager = world.user("pm", Role::ProjectManager).await?;
    let alice = world.user("alice", Role::Developer).await?;
    let bob = world.user("bob", Role::Developer).await?;
    let task = world
        .workflow
        .create_task(&manager.actor(), fix_login().with_assignees(alice.id()))
        .await?;

    world
        .workflow
        .assign_users(&manager.actor(), task.id(), vec![alice.id(), bob.id()].into())
        .await?;

    eyre::ensure!(world.messages_for(alice.id()).len() == 1);
    eyre::ensure!(world.messages_for(bob.id()).len() == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn testers_record_results_on_testing_tasks(world: World) -> eyre::Result<()> {
    let lead = world.user("rt", Role::ResponsibleTester).await?;
    let tester = world.user("qa", Role::Tester).await?;
    let developer = world.user("dev", Role::Developer).await?;
    let task = world
        .workflow
        .create_task(
            &lead.actor(),
            CreateTaskRequest::new(TaskKind::TestTask, "Verify login", "Run suite")
                .with_assignees(vec![tester.id(), developer.id()]),
        )
        .await?;
    world
        .workflow
        .change_status(&lead.actor(), task.id(), TaskStatus::Testing, None)
        .await?;

    let refused = world
        .workflow
        .record_test_result(&developer.actor(), task.id(), true, None)
        .await;
    let failed = world
        .workflow
        .record_test_result(&tester.actor(), task.id(), false, Some("500 on submit".to_owned()))
        .await?;

    eyre::ensure!(matches!(refused, Err(TaskServiceError::Authorization { .. })));
    eyre::ensure!(failed.status() == TaskStatus::TestFailed);
    eyre::ensure!(failed.testing_started_at().is_some());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn attachments_are_recorded(world: World) -> eyre::Result<()> {
    let manager = world.user("pm", Role::ProjectManager).await?;
    let task = world.workflow.create_task(&manager.actor(), fix_login()).await?;

    let updated = world
        .workflow
        .add_attachment(
            &manager.actor(),
            task.id(),
            UploadedFile::from_legacy("rapport_\u{c3}\u{a9}t\u{c3}\u{a9}.pdf", "store/42"),
        )
        .await?;

    let Some(attachment) = updated.attachments().first() else {
        eyre::bail!("attachment missing");
    };
    eyre::ensure!(attachment.name == "rapport_été.pdf");
    eyre::ensure!(attachment.uploaded_by == manager.id());
    Ok(())
}
