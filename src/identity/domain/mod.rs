//! Domain model for users, roles and the organisation hierarchy.

mod error;
mod ids;
mod role;
mod user;

pub use error::{IdentityDomainError, ParseRoleError};
pub use ids::{MentionHandle, UserId, is_handle_char};
pub use role::{Hierarchy, Role};
pub use user::{Actor, User};
