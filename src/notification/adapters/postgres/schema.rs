//! Diesel schema for stored notifications.

diesel::table! {
    /// Notifications addressed to individual users.
    notifications (id) {
        /// Notification identifier.
        id -> Uuid,
        /// Receiving user.
        recipient -> Uuid,
        /// Rendered message.
        message -> Text,
        /// Identifier of the related entity.
        related_entity_id -> Uuid,
        /// Kind of the related entity.
        #[max_length = 20]
        related_entity_type -> Varchar,
        /// Read flag.
        read -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}
