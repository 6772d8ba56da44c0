//! Free-text `@handle` scanning.

use crate::identity::domain::MentionHandle;
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

static MENTION_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?:^|[^A-Za-z0-9_.@-])@([A-Za-z0-9_][A-Za-z0-9_.-]*)").ok());

/// Returns the distinct mention handles in `text`, in order of first
/// appearance.
///
/// An `@` only starts a mention at the beginning of the text or after a
/// character that cannot be part of a handle, so e-mail addresses such as
/// `ops@example.com` are not treated as mentions.
#[must_use]
pub fn scan_mention_tokens(text: &str) -> Vec<MentionHandle> {
    let Some(pattern) = MENTION_PATTERN.as_ref() else {
        warn!("mention pattern failed to compile; no mentions scanned");
        return Vec::new();
    };
    let mut handles: Vec<MentionHandle> = Vec::new();
    for captures in pattern.captures_iter(text) {
        let Some(token) = captures.get(1) else {
            continue;
        };
        let Ok(handle) = MentionHandle::new(token.as_str()) else {
            continue;
        };
        if !handles.contains(&handle) {
            handles.push(handle);
        }
    }
    handles
}
