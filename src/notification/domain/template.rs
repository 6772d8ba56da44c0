//! Message templates rendered for each notification trigger.

use minijinja::Environment;
use serde::Serialize;
use thiserror::Error;

/// Notification message kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationTemplate {
    /// A task's status changed.
    StatusChanged,
    /// A user was mentioned in a task comment.
    CommentMention,
    /// A user was mentioned in an entity's free text.
    Mention,
    /// A user was assigned to a task.
    Assignment,
}

impl NotificationTemplate {
    /// Returns the template source.
    #[must_use]
    pub const fn source(self) -> &'static str {
        match self {
            Self::StatusChanged => concat!(
                "Task {{ task_name }} ({{ number }}) changed from {{ previous_status }} ",
                "to {{ new_status }}{% if actor %} by {{ actor }}{% endif %}",
                "{% if reason %}: {{ reason }}{% endif %}",
            ),
            Self::CommentMention => {
                "{{ author }} mentioned you in a comment on task: {{ task_name }}"
            }
            Self::Mention => "{{ author }} mentioned you in a {{ entity_type }}",
            Self::Assignment => "{{ assigner }} assigned you to task: {{ task_name }}",
        }
    }

    /// Renders the template with `context`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateRenderError`] when the context cannot be rendered.
    pub fn render(self, context: impl Serialize) -> Result<String, TemplateRenderError> {
        Environment::new()
            .render_str(self.source(), context)
            .map_err(|err| TemplateRenderError {
                template: self,
                reason: err.to_string(),
            })
    }
}

/// Error raised when a notification template fails to render.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to render {template:?} notification: {reason}")]
pub struct TemplateRenderError {
    /// Template that failed.
    pub template: NotificationTemplate,
    /// Renderer message.
    pub reason: String,
}
