//! Diesel schema for ticket persistence.

diesel::table! {
    /// Client tickets.
    tickets (id) {
        /// Internal ticket identifier.
        id -> Uuid,
        /// Ticket title.
        #[max_length = 255]
        title -> Varchar,
        /// Free-text description.
        description -> Text,
        /// Lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Billing status.
        #[max_length = 50]
        financial_status -> Varchar,
        /// Creating user.
        created_by -> Uuid,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
