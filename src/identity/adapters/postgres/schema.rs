//! Diesel schema for user records.

diesel::table! {
    /// User accounts with hierarchy back-references.
    users (id) {
        /// Internal user identifier.
        id -> Uuid,
        /// Human-readable name shown in notifications.
        #[max_length = 255]
        display_name -> Varchar,
        /// Lowercase `@handle` used for mentions.
        #[max_length = 100]
        mention_handle -> Varchar,
        /// Role in canonical string form.
        #[max_length = 50]
        role -> Varchar,
        /// Managing project manager, if any.
        project_manager -> Nullable<Uuid>,
        /// Managing group leader, if any.
        group_leader -> Nullable<Uuid>,
        /// Managing responsible tester, if any.
        responsible_tester -> Nullable<Uuid>,
    }
}
