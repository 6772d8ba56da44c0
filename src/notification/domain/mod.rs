//! Domain model for notifications and mentions.

mod mention;
mod notification;
mod template;

pub use mention::scan_mention_tokens;
pub use notification::{Notification, NotificationId, RelatedEntity, RelatedEntityType};
pub use template::{NotificationTemplate, TemplateRenderError};
