//! Diesel schema for task persistence.

diesel::table! {
    /// Task and test task records.
    ///
    /// Scalar columns mirror the fields used by scope predicates; the full
    /// aggregate lives in `document`.
    tasks (id) {
        /// Internal task identifier.
        id -> Uuid,
        /// Aggregate kind.
        #[max_length = 20]
        kind -> Varchar,
        /// Unique human-readable number.
        #[max_length = 40]
        number -> Varchar,
        /// Workflow status.
        #[max_length = 20]
        status -> Varchar,
        /// Creating user.
        created_by -> Uuid,
        /// Assigned users.
        assigned_to -> Array<Uuid>,
        /// Parent ticket.
        ticket_id -> Nullable<Uuid>,
        /// Parent task.
        parent_task_id -> Nullable<Uuid>,
        /// Due date.
        due_date -> Nullable<Timestamptz>,
        /// Estimated effort in hours.
        estimated_hours -> Nullable<Float8>,
        /// Serialized aggregate.
        document -> Jsonb,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-kind, per-day task number counters.
    task_number_sequences (kind, day) {
        /// Aggregate kind.
        #[max_length = 20]
        kind -> Varchar,
        /// Allocation day (UTC).
        day -> Date,
        /// Last allocated sequence.
        last_value -> Int4,
    }
}
