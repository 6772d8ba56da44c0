//! Comments, mentions and file references carried by a task.

use super::CommentId;
use crate::identity::domain::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A reference to a user, tracked so each user is notified once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mention {
    /// Mentioned user.
    pub user: UserId,
    /// Whether the user has been notified.
    pub notified: bool,
}

impl Mention {
    /// Creates a mention that still needs a notification.
    #[must_use]
    pub const fn pending(user: UserId) -> Self {
        Self {
            user,
            notified: false,
        }
    }
}

/// File uploaded with a comment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Display name as uploaded.
    pub original_name: String,
    /// Reference returned by file storage.
    pub storage_ref: String,
}

/// File attached directly to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Display name.
    pub name: String,
    /// Reference returned by file storage.
    pub storage_ref: String,
    /// Uploading user.
    pub uploaded_by: UserId,
    /// Upload time.
    pub uploaded_at: DateTime<Utc>,
}

/// A comment on a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment identifier.
    pub id: CommentId,
    /// Comment body.
    pub text: String,
    /// Writing user.
    pub author: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Users mentioned in the comment.
    #[serde(default)]
    pub mentions: Vec<Mention>,
    /// Files uploaded with the comment.
    #[serde(default)]
    pub files: Vec<FileDescriptor>,
}

impl Comment {
    /// Returns the users whose mention is still unnotified.
    #[must_use]
    pub fn pending_mentions(&self) -> Vec<UserId> {
        self.mentions
            .iter()
            .filter(|mention| !mention.notified)
            .map(|mention| mention.user)
            .collect()
    }
}

/// Appends a pending mention for each user not yet in `mentions`.
///
/// Returns the users that were added, in input order.
pub(super) fn merge_mentions(
    mentions: &mut Vec<Mention>,
    users: impl IntoIterator<Item = UserId>,
) -> Vec<UserId> {
    let mut added = Vec::new();
    for user in users {
        if mentions.iter().any(|mention| mention.user == user) {
            continue;
        }
        mentions.push(Mention::pending(user));
        added.push(user);
    }
    added
}

/// Marks the given users' mentions as notified.
pub(super) fn mark_notified(mentions: &mut [Mention], users: &[UserId]) {
    for mention in mentions.iter_mut() {
        if users.contains(&mention.user) {
            mention.notified = true;
        }
    }
}
