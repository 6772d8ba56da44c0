//! `PostgreSQL` repository implementation for task storage.

use super::{
    models::TaskRow,
    predicate::to_condition,
    schema::{task_number_sequences, tasks},
};
use crate::persistence::{BlockingError, DEFAULT_REQUEST_TIMEOUT, PgPool, run_blocking};
use crate::task::{
    domain::{Task, TaskId, TaskKind, TaskNumber, TaskPredicate},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use serde_json::Value;
use std::time::Duration;

const NUMBER_UNIQUE_CONSTRAINT: &str = "idx_tasks_number_unique";

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
    timeout: Duration,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self {
            pool,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Overrides the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl From<BlockingError> for TaskRepositoryError {
    fn from(err: BlockingError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let number = task.number().clone();
        let row = to_row(task)?;
        run_blocking(&self.pool, self.timeout, move |connection| {
            diesel::insert_into(tasks::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_number_unique_violation(info.as_ref()) =>
                    {
                        TaskRepositoryError::DuplicateNumber(number.clone())
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let row = to_row(task)?;
        run_blocking(&self.pool, self.timeout, move |connection| {
            let affected = diesel::update(tasks::table.filter(tasks::id.eq(row.id)))
                .set(&row)
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            if affected == 0 {
                return Err(TaskRepositoryError::NotFound(task_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        run_blocking(&self.pool, self.timeout, move |connection| {
            let document = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(tasks::document)
                .first::<Value>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            document.map(document_to_task).transpose()
        })
        .await
    }

    async fn find_by_number(&self, number: &TaskNumber) -> TaskRepositoryResult<Option<Task>> {
        let raw_number = number.as_str().to_owned();
        run_blocking(&self.pool, self.timeout, move |connection| {
            let document = tasks::table
                .filter(tasks::number.eq(raw_number))
                .select(tasks::document)
                .first::<Value>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            document.map(document_to_task).transpose()
        })
        .await
    }

    async fn find_matching(&self, predicate: &TaskPredicate) -> TaskRepositoryResult<Vec<Task>> {
        let owned_predicate = predicate.clone();
        run_blocking(&self.pool, self.timeout, move |connection| {
            let documents = tasks::table
                .filter(to_condition(&owned_predicate))
                .order((tasks::created_at.desc(), tasks::number.desc()))
                .select(tasks::document)
                .load::<Value>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            documents.into_iter().map(document_to_task).collect()
        })
        .await
    }

    async fn next_number_sequence(
        &self,
        kind: TaskKind,
        day: NaiveDate,
    ) -> TaskRepositoryResult<u32> {
        run_blocking(&self.pool, self.timeout, move |connection| {
            let allocated = diesel::insert_into(task_number_sequences::table)
                .values((
                    task_number_sequences::kind.eq(kind.as_str()),
                    task_number_sequences::day.eq(day),
                    task_number_sequences::last_value.eq(1),
                ))
                .on_conflict((task_number_sequences::kind, task_number_sequences::day))
                .do_update()
                .set(task_number_sequences::last_value.eq(task_number_sequences::last_value + 1))
                .returning(task_number_sequences::last_value)
                .get_result::<i32>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            u32::try_from(allocated).map_err(TaskRepositoryError::persistence)
        })
        .await
    }
}

fn is_number_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name() == Some(NUMBER_UNIQUE_CONSTRAINT)
}

fn to_row(task: &Task) -> TaskRepositoryResult<TaskRow> {
    let document = serde_json::to_value(task).map_err(TaskRepositoryError::persistence)?;
    Ok(TaskRow {
        id: task.id().into_inner(),
        kind: task.kind().as_str().to_owned(),
        number: task.number().as_str().to_owned(),
        status: task.status().as_str().to_owned(),
        created_by: task.created_by().into_inner(),
        assigned_to: task.assigned_to().iter().map(|user| user.into_inner()).collect(),
        ticket_id: task.ticket().map(|ticket| ticket.into_inner()),
        parent_task_id: task.parent_task().map(TaskId::into_inner),
        due_date: task.due_date(),
        estimated_hours: task.estimated_hours(),
        document,
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

fn document_to_task(document: Value) -> TaskRepositoryResult<Task> {
    serde_json::from_value(document).map_err(TaskRepositoryError::persistence)
}
