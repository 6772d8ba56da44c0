//! Translation of [`TaskPredicate`] into boxed Diesel filters.

use super::schema::tasks;
use crate::identity::domain::UserId;
use crate::task::domain::TaskPredicate;
use diesel::dsl::sql;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::{Bool, Nullable};

/// Boxed boolean condition over the `tasks` table.
pub type TaskCondition = Box<dyn BoxableExpression<tasks::table, Pg, SqlType = Nullable<Bool>>>;

/// Builds the SQL condition equivalent to `predicate`.
pub fn to_condition(predicate: &TaskPredicate) -> TaskCondition {
    match predicate {
        TaskPredicate::All => constant(true),
        TaskPredicate::CreatedBy(user) => {
            Box::new(tasks::created_by.eq(user.into_inner()).nullable())
        }
        TaskPredicate::CreatedByAny(users) => {
            Box::new(tasks::created_by.eq_any(raw_ids(users)).nullable())
        }
        TaskPredicate::AssignedTo(user) => Box::new(
            tasks::assigned_to
                .contains(vec![user.into_inner()])
                .nullable(),
        ),
        TaskPredicate::AssignedToAny(users) => {
            Box::new(tasks::assigned_to.overlaps_with(raw_ids(users)).nullable())
        }
        TaskPredicate::StatusIs(status) => Box::new(tasks::status.eq(status.as_str()).nullable()),
        TaskPredicate::KindIs(kind) => Box::new(tasks::kind.eq(kind.as_str()).nullable()),
        TaskPredicate::HasEstimate => Box::new(tasks::estimated_hours.is_not_null().nullable()),
        TaskPredicate::DueBefore(instant) => Box::new(tasks::due_date.lt(*instant).nullable()),
        TaskPredicate::And(operands) => operands
            .iter()
            .map(to_condition)
            .reduce(|lhs, rhs| Box::new(lhs.and(rhs)))
            .unwrap_or_else(|| constant(true)),
        TaskPredicate::Or(operands) => operands
            .iter()
            .map(to_condition)
            .reduce(|lhs, rhs| Box::new(lhs.or(rhs)))
            .unwrap_or_else(|| constant(false)),
    }
}

fn constant(value: bool) -> TaskCondition {
    Box::new(sql::<Nullable<Bool>>(if value { "TRUE" } else { "FALSE" }))
}

fn raw_ids(users: &[UserId]) -> Vec<uuid::Uuid> {
    users.iter().map(|user| user.into_inner()).collect()
}
