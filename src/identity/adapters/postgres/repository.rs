//! `PostgreSQL` repository implementation for user lookups.

use super::{models::UserRow, schema::users};
use crate::identity::{
    domain::{Hierarchy, MentionHandle, Role, User, UserId},
    ports::{UserRepository, UserRepositoryError, UserRepositoryResult},
};
use crate::persistence::{BlockingError, DEFAULT_REQUEST_TIMEOUT, PgPool, run_blocking};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::time::Duration;

/// `PostgreSQL`-backed user repository.
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
    timeout: Duration,
}

impl PostgresUserRepository {
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

    async fn query<F>(&self, f: F) -> UserRepositoryResult<Vec<User>>
    where
        F: FnOnce(&mut PgConnection) -> QueryResult<Vec<UserRow>> + Send + 'static,
    {
        run_blocking(&self.pool, self.timeout, move |connection| {
            let rows = f(connection).map_err(UserRepositoryError::persistence)?;
            rows.into_iter().map(row_to_user).collect()
        })
        .await
    }
}

impl From<BlockingError> for UserRepositoryError {
    fn from(err: BlockingError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn store(&self, user: &User) -> UserRepositoryResult<()> {
        let row = user_to_row(user);
        let user_id = user.id();
        let handle = user.mention_handle().clone();
        run_blocking(&self.pool, self.timeout, move |connection| {
            diesel::insert_into(users::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if info.constraint_name() == Some("idx_users_mention_handle_unique") =>
                    {
                        UserRepositoryError::DuplicateHandle(handle.clone())
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        UserRepositoryError::DuplicateUser(user_id)
                    }
                    _ => UserRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: UserId) -> UserRepositoryResult<Option<User>> {
        let found = self
            .query(move |connection| {
                users::table
                    .filter(users::id.eq(id.into_inner()))
                    .select(UserRow::as_select())
                    .load(connection)
            })
            .await?;
        Ok(found.into_iter().next())
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> UserRepositoryResult<Vec<User>> {
        let raw_ids: Vec<uuid::Uuid> = ids.iter().map(|id| id.into_inner()).collect();
        self.query(move |connection| {
            users::table
                .filter(users::id.eq_any(raw_ids))
                .order(users::id)
                .select(UserRow::as_select())
                .load(connection)
        })
        .await
    }

    async fn find_by_role(&self, role: Role) -> UserRepositoryResult<Vec<User>> {
        self.query(move |connection| {
            users::table
                .filter(users::role.eq(role.as_str()))
                .order(users::id)
                .select(UserRow::as_select())
                .load(connection)
        })
        .await
    }

    async fn find_reports(
        &self,
        relation: Hierarchy,
        manager: UserId,
    ) -> UserRepositoryResult<Vec<User>> {
        let manager_id = manager.into_inner();
        self.query(move |connection| {
            let base = users::table.select(UserRow::as_select()).order(users::id);
            match relation {
                Hierarchy::ProjectManager => base
                    .filter(users::project_manager.eq(manager_id))
                    .load(connection),
                Hierarchy::GroupLeader => base
                    .filter(users::group_leader.eq(manager_id))
                    .load(connection),
                Hierarchy::ResponsibleTester => base
                    .filter(users::responsible_tester.eq(manager_id))
                    .load(connection),
            }
        })
        .await
    }

    async fn find_by_mention_handles(
        &self,
        handles: &[MentionHandle],
    ) -> UserRepositoryResult<Vec<User>> {
        let raw_handles: Vec<String> = handles
            .iter()
            .map(|handle| handle.as_str().to_owned())
            .collect();
        self.query(move |connection| {
            users::table
                .filter(users::mention_handle.eq_any(raw_handles))
                .select(UserRow::as_select())
                .load(connection)
        })
        .await
    }
}

fn user_to_row(user: &User) -> UserRow {
    UserRow {
        id: user.id().into_inner(),
        display_name: user.display_name().to_owned(),
        mention_handle: user.mention_handle().as_str().to_owned(),
        role: user.role().as_str().to_owned(),
        project_manager: user
            .manager(Hierarchy::ProjectManager)
            .map(UserId::into_inner),
        group_leader: user.manager(Hierarchy::GroupLeader).map(UserId::into_inner),
        responsible_tester: user
            .manager(Hierarchy::ResponsibleTester)
            .map(UserId::into_inner),
    }
}

pub(crate) fn row_to_user(row: UserRow) -> UserRepositoryResult<User> {
    let UserRow {
        id,
        display_name,
        mention_handle,
        role,
        project_manager,
        group_leader,
        responsible_tester,
    } = row;

    let handle = MentionHandle::new(mention_handle).map_err(UserRepositoryError::persistence)?;
    let parsed_role = Role::try_from(role.as_str()).map_err(UserRepositoryError::persistence)?;
    let mut user = User::new(display_name, handle, parsed_role)
        .map_err(UserRepositoryError::persistence)?
        .with_id(UserId::from_uuid(id));

    let links = [
        (Hierarchy::ProjectManager, project_manager),
        (Hierarchy::GroupLeader, group_leader),
        (Hierarchy::ResponsibleTester, responsible_tester),
    ];
    for (relation, manager) in links {
        if let Some(manager_id) = manager {
            user = user.reporting_to(relation, UserId::from_uuid(manager_id));
        }
    }
    Ok(user)
}
